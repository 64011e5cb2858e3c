use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int32Array, Int64Array, ListBuilder, StringArray, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const TOPICS: [&str; 4] = [
    "Endometriosis",
    "Dysmenorrhea",
    "Polycystic Ovary Syndrome",
    "Postpartum Hemorrhage",
];
const BASELINE_TOPIC: &str = "Heart Arrest";

/// (label, weight) pairs for the gender predictor output.
type Weighted = &'static [(&'static str, f64)];

const TOPIC_GENDERS: Weighted = &[
    ("female", 0.46),
    ("mostly_female", 0.06),
    ("male", 0.22),
    ("mostly_male", 0.04),
    ("andy", 0.04),
    ("unknown", 0.14),
    ("", 0.04),
];
const BASELINE_GENDERS: Weighted = &[
    ("female", 0.22),
    ("mostly_female", 0.04),
    ("male", 0.46),
    ("mostly_male", 0.06),
    ("andy", 0.04),
    ("unknown", 0.14),
    ("", 0.04),
];
const TOPIC_COUNTRIES: Weighted = &[
    ("United States", 0.34),
    ("England", 0.16),
    ("China", 0.12),
    ("Japan", 0.08),
    ("Germany", 0.08),
    ("Italy", 0.08),
    ("Qatar", 0.02),
    ("", 0.12),
];
// No Qatar: selecting it shows the missing-baseline state.
const BASELINE_COUNTRIES: Weighted = &[
    ("United States", 0.38),
    ("England", 0.16),
    ("China", 0.12),
    ("Japan", 0.1),
    ("Germany", 0.1),
    ("Italy", 0.06),
    ("", 0.08),
];

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

    fn pick(&mut self, choices: Weighted) -> &'static str {
        let total: f64 = choices.iter().map(|(_, w)| w).sum();
        let mut target = self.next_f64() * total;
        for &(label, weight) in choices {
            if target < weight {
                return label;
            }
            target -= weight;
        }
        choices[choices.len() - 1].0
    }

    /// Publication year in 2000..=2025, more likely towards the present.
    fn year(&mut self) -> i32 {
        let u = self.next_f64().sqrt();
        2000 + (u * 25.999).floor() as i32
    }
}

/// One output row, named like the cleaned PubMed exports.
#[derive(Debug, Serialize)]
struct Row {
    #[serde(rename = "PMID")]
    pmid: i64,
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Country")]
    country: Option<String>,
    #[serde(rename = "MeSH_Clean")]
    mesh: String,
    #[serde(rename = "Predicted_First_Gender")]
    first_gender: Option<String>,
    #[serde(rename = "Predicted_Last_Gender")]
    last_gender: Option<String>,
    #[serde(skip)]
    tags: Vec<String>,
}

fn non_empty(label: &str) -> Option<String> {
    (!label.is_empty()).then(|| label.to_string())
}

/// Python-literal list, as written by pandas for list cells.
fn encode_tags(tags: &[String]) -> String {
    let items: Vec<String> = tags
        .iter()
        .map(|t| format!("'{}'", t.replace('\\', "\\\\").replace('\'', "\\'")))
        .collect();
    format!("[{}]", items.join(", "))
}

fn generate_rows(
    rng: &mut SimpleRng,
    n: usize,
    first_pmid: i64,
    topics: impl Fn(&mut SimpleRng) -> Vec<String>,
    countries: Weighted,
    genders: Weighted,
) -> Vec<Row> {
    (0..n)
        .map(|i| {
            let mut tags = topics(rng);
            tags.extend(["Humans", "Female"].map(String::from));
            if rng.next_f64() < 0.5 {
                tags.push("Adult".to_string());
            }
            Row {
                pmid: first_pmid + i as i64,
                year: rng.year(),
                country: non_empty(rng.pick(countries)),
                mesh: encode_tags(&tags),
                first_gender: non_empty(rng.pick(genders)),
                last_gender: non_empty(rng.pick(genders)),
                tags,
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("Wrote {} publications to {}", rows.len(), path.display());
    Ok(())
}

/// Parquet copy with `MeSH_Clean` as a native list column.
fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let mut mesh_builder = ListBuilder::new(StringBuilder::new());
    for row in rows {
        for tag in &row.tags {
            mesh_builder.values().append_value(tag);
        }
        mesh_builder.append(true);
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("PMID", DataType::Int64, false),
        Field::new("Year", DataType::Int32, false),
        Field::new("Country", DataType::Utf8, true),
        Field::new(
            "MeSH_Clean",
            DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
            true,
        ),
        Field::new("Predicted_First_Gender", DataType::Utf8, true),
        Field::new("Predicted_Last_Gender", DataType::Utf8, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.pmid))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year))),
            Arc::new(StringArray::from_iter(rows.iter().map(|r| r.country.as_deref()))),
            Arc::new(mesh_builder.finish()),
            Arc::new(StringArray::from_iter(
                rows.iter().map(|r| r.first_gender.as_deref()),
            )),
            Arc::new(StringArray::from_iter(
                rows.iter().map(|r| r.last_gender.as_deref()),
            )),
        ],
    )
    .context("building record batch")?;

    let file =
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    println!("Wrote {} publications to {}", rows.len(), path.display());
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let out_dir = Path::new("data");
    std::fs::create_dir_all(out_dir).context("creating data directory")?;

    // Mostly one topic per article, sometimes two.
    let topic_rows = generate_rows(
        &mut rng,
        2400,
        10_000_000,
        |rng| {
            let first = (rng.next_f64() * TOPICS.len() as f64) as usize % TOPICS.len();
            let mut tags = vec![TOPICS[first].to_string()];
            if rng.next_f64() < 0.1 {
                tags.push(TOPICS[(first + 1) % TOPICS.len()].to_string());
            }
            tags
        },
        TOPIC_COUNTRIES,
        TOPIC_GENDERS,
    );
    let baseline_rows = generate_rows(
        &mut rng,
        1800,
        20_000_000,
        |_| vec![BASELINE_TOPIC.to_string()],
        BASELINE_COUNTRIES,
        BASELINE_GENDERS,
    );

    write_csv(&out_dir.join("cleaned_female_data.csv"), &topic_rows)?;
    write_csv(&out_dir.join("cleaned_neutral_data.csv"), &baseline_rows)?;
    write_parquet(&out_dir.join("cleaned_female_data.parquet"), &topic_rows)?;
    Ok(())
}
