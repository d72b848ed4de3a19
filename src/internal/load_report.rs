#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use hashstores::{ChainingStore, KeyValueStore, ProbingStore, StoreError};
use plotters::prelude::*;
use rand::Rng;

// Both stores get the same number of buckets/slots
const TABLE_SIZE: usize = 100_000;
// Load factors from 0.1 to 0.95
const NUM_LOAD_FACTORS: usize = 10;

const METHODS: [&str; 2] = ["Linear Probing", "Separate Chaining"];

/// Lookup cost measured at one load factor
#[derive(Debug, Clone, Copy)]
struct Measurement {
    average: f64,
    worst: usize,
}

fn fill<S: KeyValueStore<u64, u64>>(store: &mut S, keys: &[u64]) -> Result<(), StoreError> {
    for &key in keys {
        store.insert(key, key)?;
    }
    Ok(())
}

fn measure_probing(keys: &[u64]) -> Result<Measurement, StoreError> {
    let mut store: ProbingStore<u64, u64> = ProbingStore::with_capacity(TABLE_SIZE)?;
    fill(&mut store, keys)?;

    let probes: Vec<usize> = keys.iter().filter_map(|key| store.probe_length(key)).collect();
    let average = probes.iter().sum::<usize>() as f64 / probes.len().max(1) as f64;
    let worst = probes.iter().copied().max().unwrap_or(0);
    Ok(Measurement { average, worst })
}

fn measure_chaining(keys: &[u64]) -> Result<Measurement, StoreError> {
    let mut store: ChainingStore<u64, u64> = ChainingStore::with_buckets(TABLE_SIZE)?;
    fill(&mut store, keys)?;

    // Finding the i-th entry of a chain walks i entries
    let walked: usize = store.chain_lengths().iter().map(|&len| len * (len + 1) / 2).sum();
    let average = walked as f64 / store.len().max(1) as f64;
    Ok(Measurement { average, worst: store.longest_chain() })
}

fn draw_chart(
    path: &str,
    caption: &str,
    y_desc: &str,
    x_labels: &[String],
    series: &[Vec<f64>],
) -> Result<(), Box<dyn std::error::Error>> {
    let font_family = "sans-serif";
    let colors = [
        RGBColor(220, 50, 50), // Bright red
        RGBColor(50, 90, 220), // Bright blue
    ];

    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_y = series
        .iter()
        .flat_map(|values| values.iter())
        .fold(0.0, |max, &y| if y > max { y } else { max }) *
        1.1; // Add 10% margin

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, (font_family, 35))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0..x_labels.len(), 0.0..max_y)?;

    chart
        .configure_mesh()
        .x_labels(x_labels.len())
        .x_label_formatter(&|x| x_labels.get(*x).cloned().unwrap_or_default())
        .x_desc("Load Factor")
        .y_desc(y_desc)
        .axis_desc_style((font_family, 16))
        .draw()?;

    for (method_idx, values) in series.iter().enumerate() {
        let color = &colors[method_idx % colors.len()];
        let line_style = ShapeStyle::from(color).stroke_width(2);

        chart
            .draw_series(LineSeries::new(values.iter().copied().enumerate(), line_style))?
            .label(METHODS[method_idx])
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));

        chart.draw_series(
            values.iter().copied().enumerate().map(|point| Circle::new(point, 4, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let load_factors: Vec<f64> = (0..NUM_LOAD_FACTORS)
        .map(|i| 0.1 + (0.95 - 0.1) * (i as f64) / ((NUM_LOAD_FACTORS - 1) as f64))
        .collect();
    let num_keys: Vec<usize> =
        load_factors.iter().map(|&load| (TABLE_SIZE as f64 * load) as usize).collect();

    let mut rng = rand::rng();
    let max_keys_needed = num_keys.iter().copied().max().unwrap_or(0);
    let keys: Vec<u64> = (0..max_keys_needed).map(|_| rng.random()).collect();

    let mut average_lookup: Vec<Vec<f64>> = vec![Vec::new(); METHODS.len()];
    let mut worst_lookup: Vec<Vec<f64>> = vec![Vec::new(); METHODS.len()];

    for &n_keys in &num_keys {
        let sample = &keys[..n_keys];
        let results = [measure_probing(sample)?, measure_chaining(sample)?];

        println!("Testing with {n_keys} keys");
        for (method_idx, result) in results.iter().enumerate() {
            println!(
                "  {}: Avg lookup = {:.2}, Worst = {}",
                METHODS[method_idx], result.average, result.worst
            );
            average_lookup[method_idx].push(result.average);
            worst_lookup[method_idx].push(result.worst as f64);
        }
    }

    let x_labels: Vec<String> = load_factors.iter().map(|load| format!("{load:.2}")).collect();
    draw_chart(
        "average_lookup_cost.png",
        "Average Successful Lookup Cost",
        "Slots / entries visited",
        &x_labels,
        &average_lookup,
    )?;
    draw_chart(
        "worst_lookup_cost.png",
        "Worst-Case Lookup Cost",
        "Slots / entries visited",
        &x_labels,
        &worst_lookup,
    )?;

    println!("Generated plot images: average_lookup_cost.png, worst_lookup_cost.png");
    Ok(())
}
