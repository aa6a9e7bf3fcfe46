use yama::terrain::{HeightField, HeightSample, IndexedGrid};
use yama::BackgroundConfig;

fn print_stats(config: &BackgroundConfig) {
    let field = HeightField::new(config.noise, config.policy.clone()).with_floor(config.floor);
    let samples: Vec<HeightSample> = field.generate(&config.grid);
    if samples.is_empty() {
        println!("{}: empty grid", field.policy().name());
        return;
    }

    let count = samples.len() as f64;
    let min = samples.iter().map(|s| s.elevation).fold(f64::INFINITY, f64::min);
    let max = samples.iter().map(|s| s.elevation).fold(0.0, f64::max);
    let avg = samples.iter().map(|s| s.elevation).sum::<f64>() / count;

    let shaped = samples.iter().filter(|s| s.influence > 0.5).count();
    let flat = samples.iter().filter(|s| s.elevation < 0.5).count();

    let indexed = IndexedGrid::build(config.grid, &field, &config.palette);

    println!("{} height stats:", field.policy().name());
    println!("  Vertices: {}", samples.len());
    println!("  Triangles: {}", indexed.triangle_count());
    println!("  Min: {:.3}", min);
    println!("  Max: {:.3}", max);
    println!("  Avg: {:.3}", avg);
    println!(
        "  Peak zones (influence>0.5): {} ({:.1}%)",
        shaped,
        shaped as f64 * 100.0 / count
    );
    println!(
        "  Near-flat (h<0.5): {} ({:.1}%)",
        flat,
        flat as f64 * 100.0 / count
    );
}

fn main() {
    print_stats(&BackgroundConfig::default());
    println!();
    print_stats(&BackgroundConfig::five_peaks());
}
