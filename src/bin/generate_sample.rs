//! Writes plausible sample renditions of the five cleaned tables under
//! `data/clean/`, so the dashboard can be exercised without the upstream
//! data pipeline. Deterministic: the same files are produced on every run.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Days since 1970-01-01 for a calendar date.
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = if month > 2 { month - 3 } else { month + 9 } as i64;
    let doy = (153 * mp + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe - 719468
}

fn write_parquet(path: &str, fields: Vec<Field>, columns: Vec<ArrayRef>) {
    let parent = Path::new(path).parent().expect("output path has a parent");
    std::fs::create_dir_all(parent).expect("creating output directory");

    let schema = Arc::new(Schema::new(fields));
    let batch =
        RecordBatch::try_new(schema.clone(), columns).expect("schema matches the columns");

    let file = std::fs::File::create(path).expect("creating output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("creating parquet writer");
    writer.write(&batch).expect("writing batch");
    writer.close().expect("closing parquet writer");
    println!("Wrote {} rows to {path}", batch.num_rows());
}

/// PeMS: two raw sensor aggregates per day, 2010 through 2023, with a mild
/// growth trend, weekly seasonality, and noise.
fn write_pems(rng: &mut SimpleRng) {
    let start = days_from_civil(2010, 1, 1);
    let end = days_from_civil(2023, 12, 31);

    let mut dates: Vec<i32> = Vec::new();
    let mut vmt: Vec<f64> = Vec::new();
    for day in start..=end {
        let t = (day - start) as f64;
        let trend = 70_000_000.0 + 400_000.0 * (t / 365.25);
        let weekly = 6_000_000.0 * (t * std::f64::consts::TAU / 7.0).sin();
        for _ in 0..2 {
            dates.push(day as i32);
            vmt.push((trend + weekly + rng.gauss(0.0, 2_500_000.0)).max(0.0));
        }
    }

    write_parquet(
        "data/clean/pems/pems.parquet",
        vec![
            Field::new("date", DataType::Date32, false),
            Field::new("vmt", DataType::Float64, false),
        ],
        vec![
            Arc::new(Date32Array::from(dates)),
            Arc::new(Float64Array::from(vmt)),
        ],
    );
}

/// HPMS PRD Table 6: one row per year and functional class, urban and rural
/// DVMT in thousands.
fn write_hpms_table_6(rng: &mut SimpleRng) {
    let mut timestamps: Vec<i32> = Vec::new();
    let mut urban: Vec<f64> = Vec::new();
    let mut rural: Vec<f64> = Vec::new();
    for year in 2010..=2022 {
        let day = days_from_civil(year, 1, 1) as i32;
        for class in 1..=7 {
            timestamps.push(day);
            let share = 1.0 / (class as f64);
            urban.push(rng.gauss(9_000.0 * share, 400.0 * share).max(0.0));
            rural.push(rng.gauss(3_000.0 * share, 200.0 * share).max(0.0));
        }
    }

    write_parquet(
        "data/clean/hpms/table_6.parquet",
        vec![
            Field::new("timestamp", DataType::Date32, false),
            Field::new("dvmt_1000_urban", DataType::Float64, false),
            Field::new("dvmt_1000_rural", DataType::Float64, false),
        ],
        vec![
            Arc::new(Date32Array::from(timestamps)),
            Arc::new(Float64Array::from(urban)),
            Arc::new(Float64Array::from(rural)),
        ],
    );
}

/// HPMS PRD Table 9: one row per year and MPO, DVMT in thousands. Only the
/// SANDAG rows end up on the chart.
fn write_hpms_table_9(rng: &mut SimpleRng) {
    let mpos = ["SANDAG", "SCAG", "MTC", "AMBAG"];
    let base = [80_000.0, 420_000.0, 150_000.0, 20_000.0];

    let mut timestamps: Vec<i32> = Vec::new();
    let mut mpo_col: Vec<String> = Vec::new();
    let mut dvmt: Vec<f64> = Vec::new();
    for year in 2010..=2022 {
        let day = days_from_civil(year, 1, 1) as i32;
        for (mpo, base) in mpos.iter().zip(base) {
            timestamps.push(day);
            mpo_col.push(mpo.to_string());
            dvmt.push(rng.gauss(base, base * 0.05).max(0.0));
        }
    }

    write_parquet(
        "data/clean/hpms/table_9.parquet",
        vec![
            Field::new("timestamp", DataType::Date32, false),
            Field::new("mpo", DataType::Utf8, false),
            Field::new("dvmt_1000", DataType::Float64, false),
        ],
        vec![
            Arc::new(Date32Array::from(timestamps)),
            Arc::new(StringArray::from(mpo_col)),
            Arc::new(Float64Array::from(dvmt)),
        ],
    );
}

/// INRIX UMR: one row per year and urban area with freeway and arterial
/// DVMT in thousands.
fn write_inrix(rng: &mut SimpleRng) {
    let areas = ["San Diego CA", "Los Angeles CA", "Phoenix AZ"];
    let freeway_base = [55_000.0, 230_000.0, 48_000.0];
    let arterial_base = [28_000.0, 120_000.0, 30_000.0];

    let mut years: Vec<i64> = Vec::new();
    let mut area_col: Vec<String> = Vec::new();
    let mut freeway: Vec<f64> = Vec::new();
    let mut arterial: Vec<f64> = Vec::new();
    for year in 2010..=2022 {
        for i in 0..areas.len() {
            years.push(year);
            area_col.push(areas[i].to_string());
            freeway.push(rng.gauss(freeway_base[i], freeway_base[i] * 0.04).max(0.0));
            arterial.push(
                rng.gauss(arterial_base[i], arterial_base[i] * 0.04).max(0.0),
            );
        }
    }

    write_parquet(
        "data/clean/inrix/umr2022.parquet",
        vec![
            Field::new("Year", DataType::Int64, false),
            Field::new("Urban Area", DataType::Utf8, false),
            Field::new("Freeway DVMT", DataType::Float64, false),
            Field::new("Arterial Street DVMT", DataType::Float64, false),
        ],
        vec![
            Arc::new(Int64Array::from(years)),
            Arc::new(StringArray::from(area_col)),
            Arc::new(Float64Array::from(freeway)),
            Arc::new(Float64Array::from(arterial)),
        ],
    );
}

/// EMFAC: one row per model version, calendar year, and vehicle category.
/// The chart sums categories within a (model, year) group.
fn write_emfac(rng: &mut SimpleRng) {
    let models = ["EMFAC 2017", "EMFAC 2021", "EMFAC 2025"];
    let categories = ["LDA", "LDT1", "HHDT"];
    let category_share = [0.55, 0.3, 0.15];

    let mut model_col: Vec<String> = Vec::new();
    let mut year_col: Vec<i64> = Vec::new();
    let mut category_col: Vec<String> = Vec::new();
    let mut total_vmt: Vec<f64> = Vec::new();
    for (m, model) in models.iter().enumerate() {
        for year in 2010..=2050 {
            let growth = 1.0 + 0.01 * (year - 2010) as f64;
            // Later model versions project slightly lower totals.
            let model_bias = 1.0 - 0.03 * m as f64;
            for (category, share) in categories.iter().zip(category_share) {
                model_col.push(model.to_string());
                year_col.push(year);
                category_col.push(category.to_string());
                let mean = 85_000_000.0 * growth * model_bias * share;
                total_vmt.push(rng.gauss(mean, mean * 0.02).max(0.0));
            }
        }
    }

    write_parquet(
        "data/clean/emfac/emfac.parquet",
        vec![
            Field::new("EMFAC Model", DataType::Utf8, false),
            Field::new("Calendar Year", DataType::Int64, false),
            Field::new("Vehicle Category", DataType::Utf8, false),
            Field::new("Total VMT", DataType::Float64, false),
        ],
        vec![
            Arc::new(StringArray::from(model_col)),
            Arc::new(Int64Array::from(year_col)),
            Arc::new(StringArray::from(category_col)),
            Arc::new(Float64Array::from(total_vmt)),
        ],
    );
}

fn main() {
    let mut rng = SimpleRng::new(42);

    write_pems(&mut rng);
    write_hpms_table_6(&mut rng);
    write_hpms_table_9(&mut rng);
    write_inrix(&mut rng);
    write_emfac(&mut rng);
}
