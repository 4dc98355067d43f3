use std::sync::Arc;

use arrow::array::{Float64Array, Int32Array, StringArray};
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

struct Municipality {
    name: &'static str,
    regional: &'static str,
    macro_region: &'static str,
    latitude: f64,
    longitude: f64,
}

const MUNICIPALITIES: &[Municipality] = &[
    Municipality { name: "Teresina", regional: "Entre Rios", macro_region: "Meio-Norte", latitude: -5.09, longitude: -42.80 },
    Municipality { name: "José de Freitas", regional: "Entre Rios", macro_region: "Meio-Norte", latitude: -4.76, longitude: -42.58 },
    Municipality { name: "Campo Maior", regional: "Carnaubais", macro_region: "Meio-Norte", latitude: -4.83, longitude: -42.17 },
    Municipality { name: "Piripiri", regional: "Cocais", macro_region: "Litoral", latitude: -4.27, longitude: -41.78 },
    Municipality { name: "Parnaíba", regional: "Planície Litorânea", macro_region: "Litoral", latitude: -2.90, longitude: -41.78 },
    Municipality { name: "Luís Correia", regional: "Planície Litorânea", macro_region: "Litoral", latitude: -2.88, longitude: -41.67 },
    Municipality { name: "Floriano", regional: "Vale dos Rios", macro_region: "Semiárido", latitude: -6.77, longitude: -43.02 },
    Municipality { name: "Picos", regional: "Vale do Guaribas", macro_region: "Semiárido", latitude: -7.08, longitude: -41.47 },
    Municipality { name: "Oeiras", regional: "Vale do Canindé", macro_region: "Semiárido", latitude: -7.02, longitude: -42.13 },
    Municipality { name: "São Raimundo Nonato", regional: "Serra da Capivara", macro_region: "Cerrados", latitude: -9.01, longitude: -42.70 },
    Municipality { name: "Bom Jesus", regional: "Chapada das Mangabeiras", macro_region: "Cerrados", latitude: -9.07, longitude: -44.36 },
    Municipality { name: "Corrente", regional: "Chapada das Mangabeiras", macro_region: "Cerrados", latitude: -10.44, longitude: -45.16 },
];

/// Percentage-like indicators: (base level, yearly drift, noise).
const RATE_PARAMS: [(f64, f64, f64); 4] = [
    (62.0, 1.2, 6.0),  // prenatal visit coverage
    (55.0, 1.8, 8.0),  // HIV/syphilis testing
    (58.0, 1.0, 7.0),  // live births with 6+ visits (stored as counts below)
    (48.0, 0.6, 5.0),  // cesarean deliveries
];

fn main() {
    let mut rng = SimpleRng::new(42);
    let years: Vec<i32> = (2012..=2022).collect();

    let mut col_year: Vec<i32> = Vec::new();
    let mut col_macro: Vec<&str> = Vec::new();
    let mut col_regional: Vec<&str> = Vec::new();
    let mut col_municipality: Vec<&str> = Vec::new();
    let mut col_lat: Vec<f64> = Vec::new();
    let mut col_lon: Vec<f64> = Vec::new();
    let mut indicators: [Vec<Option<f64>>; 5] = Default::default();

    for &year in &years {
        let drift = f64::from(year - years[0]);
        for mun in MUNICIPALITIES {
            col_year.push(year);
            col_macro.push(mun.macro_region);
            col_regional.push(mun.regional);
            col_municipality.push(mun.name);
            col_lat.push(mun.latitude);
            col_lon.push(mun.longitude);

            for (slot, &(base, trend, noise)) in indicators[..4].iter_mut().zip(&RATE_PARAMS) {
                // Roughly 6% of observations are missing.
                if rng.next_f64() < 0.06 {
                    slot.push(None);
                    continue;
                }
                let value = rng.gauss(base + trend * drift, noise).clamp(0.0, 100.0);
                slot.push(Some(value));
            }
            // live-birth column is a count, overwrite the rate draw
            if let Some(v) = indicators[2].last_mut() {
                if v.is_some() {
                    *v = Some(rng.gauss(400.0, 120.0).max(0.0).round());
                }
            }

            // maternal mortality ratio per 100k live births
            if rng.next_f64() < 0.10 {
                indicators[4].push(None);
            } else {
                indicators[4].push(Some(rng.gauss(60.0, 18.0).max(0.0)));
            }
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("year", DataType::Int32, false),
        Field::new("macro_region", DataType::Utf8, false),
        Field::new("regional", DataType::Utf8, false),
        Field::new("municipality", DataType::Utf8, false),
        Field::new("latitude", DataType::Float64, false),
        Field::new("longitude", DataType::Float64, false),
        Field::new("prenatal_visits", DataType::Float64, true),
        Field::new("hiv_syphilis_testing", DataType::Float64, true),
        Field::new("live_births_six_visits", DataType::Float64, true),
        Field::new("cesarean_deliveries", DataType::Float64, true),
        Field::new("maternal_mortality_ratio", DataType::Float64, true),
    ]));

    let n_rows = col_year.len();
    let [in1, in2, in3, in4, in5] = indicators;
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int32Array::from(col_year)),
            Arc::new(StringArray::from(col_macro)),
            Arc::new(StringArray::from(col_regional)),
            Arc::new(StringArray::from(col_municipality)),
            Arc::new(Float64Array::from(col_lat)),
            Arc::new(Float64Array::from(col_lon)),
            Arc::new(Float64Array::from(in1)),
            Arc::new(Float64Array::from(in2)),
            Arc::new(Float64Array::from(in3)),
            Arc::new(Float64Array::from(in4)),
            Arc::new(Float64Array::from(in5)),
        ],
    )
    .expect("Failed to create RecordBatch");

    let output_path = "data/maternal_health_indicators.parquet";
    std::fs::create_dir_all("data").expect("Failed to create data directory");
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote {n_rows} rows ({} municipalities × {} years) to {output_path}",
        MUNICIPALITIES.len(),
        years.len()
    );
}
