//! Step the coated-bubble profile and print mass-like totals.
//!
//! Run with `cargo run -p trimix-bench --example bubble_steps`.

use trimix_bench::{advect_and_step, bubble_fractions, field_total, reference_profile};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut profile = reference_profile()?;
    for step in 0..5 {
        // Shrink the drop a little each step in place of a real advection.
        let radius = 0.3 - 0.01 * step as f64;
        let (f1, f2) = bubble_fractions(profile.world.space(), radius, 0.05);
        advect_and_step(&mut profile, &f1, &f2)?;
        let f = profile.fields;
        let dirty = profile.world.take_dirty();
        println!(
            "step {:>2}: density {:>12.3}  modulus {:>10.3}  dirty {:?}",
            profile.world.current_step(),
            field_total(&profile.world, f.density),
            field_total(&profile.world, f.elastic_modulus),
            dirty,
        );
    }
    Ok(())
}
