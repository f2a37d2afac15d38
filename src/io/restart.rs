//! HDF5 restart format (§6 "Restart format"). One group per particle,
//! `/Particle_NNNNNNNN`, holding exactly the fields `save`/`load` round-trip:
//! `Mass`, `Rho`, `h`, `Tag`, `IsFree`, `x`, `v`. Auxiliary accumulators are
//! not persisted — they are rebuilt on the first step after `load` (§6).

use hdf5::File;

use crate::particle::Particle;
use crate::vector::Vec3;

/// Writes `<key>.hdf5` as a restart snapshot (§6, §4.G step 12 "auto_save").
pub fn save(particles: &[Particle], key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = format!("{key}.hdf5");
    let file = File::create(&path)?;
    file.new_dataset_builder()
        .with_data(&[particles.len() as i32][..])
        .create("NP")?;

    for (i, p) in particles.iter().enumerate() {
        let group = file.create_group(&format!("/Particle_{i:08}"))?;
        group
            .new_dataset_builder()
            .with_data(&[p.mass][..])
            .create("Mass")?;
        group
            .new_dataset_builder()
            .with_data(&[p.density][..])
            .create("Rho")?;
        group
            .new_dataset_builder()
            .with_data(&[p.h][..])
            .create("h")?;
        group
            .new_dataset_builder()
            .with_data(&[p.id][..])
            .create("Tag")?;
        group
            .new_dataset_builder()
            .with_data(&[if p.is_free { 1i32 } else { 0i32 }][..])
            .create("IsFree")?;
        group
            .new_dataset_builder()
            .with_data(&[p.x.x, p.x.y, p.x.z][..])
            .create("x")?;
        group
            .new_dataset_builder()
            .with_data(&[p.v.x, p.v.y, p.v.z][..])
            .create("v")?;
    }
    file.flush()?;
    Ok(())
}

/// Loads particles back from `<key>.hdf5` (§6, §7 "Input fatal" on a missing
/// file). Auxiliary accumulators and numerical-policy fields are left at
/// their constructor defaults; `Domain::load`'s caller is responsible for
/// re-stamping policy fields before the first `solve` call.
pub fn load(key: &str) -> Result<Vec<Particle>, Box<dyn std::error::Error>> {
    let path = format!("{key}.hdf5");
    if !std::path::Path::new(&path).exists() {
        return Err(format!("restart file not found: {path}").into());
    }
    let file = File::open(&path)?;
    let np = file.dataset("NP")?.read_1d::<i32>()?[0] as usize;

    let mut particles = Vec::with_capacity(np);
    for i in 0..np {
        let group = file.group(&format!("/Particle_{i:08}"))?;
        let mass = group.dataset("Mass")?.read_1d::<f64>()?[0];
        let density = group.dataset("Rho")?.read_1d::<f64>()?[0];
        let h = group.dataset("h")?.read_1d::<f64>()?[0];
        let tag = group.dataset("Tag")?.read_1d::<i32>()?[0];
        let is_free = group.dataset("IsFree")?.read_1d::<i32>()?[0] == 1;
        let x = group.dataset("x")?.read_1d::<f64>()?;
        let v = group.dataset("v")?.read_1d::<f64>()?;

        let mut p = Particle::new(
            tag,
            Vec3::new(x[0], x[1], x[2]),
            Vec3::new(v[0], v[1], v[2]),
            mass,
            density,
            h,
            is_free,
        );
        p.ref_density = density;
        p.density_half = density;
        particles.push(p);
    }
    Ok(particles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_particles() -> Vec<Particle> {
        vec![
            Particle::new(1, Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.1, 0.0, 0.0), 1.0, 1000.0, 0.01, true),
            Particle::new(2, Vec3::new(1.0, 2.0, 3.0), Vec3::zero(), 2.0, 998.21, 0.02, false),
        ]
    }

    #[test]
    fn save_then_load_round_trips_persisted_fields() {
        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("restart").to_string_lossy().into_owned();
        let original = sample_particles();
        save(&original, &key).unwrap();
        let loaded = load(&key).unwrap();

        assert_eq!(loaded.len(), original.len());
        for (a, b) in original.iter().zip(loaded.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.is_free, b.is_free);
            assert_eq!(a.mass, b.mass);
            assert_eq!(a.density, b.density);
            assert_eq!(a.h, b.h);
            assert_eq!(a.x, b.x);
            assert_eq!(a.v, b.v);
        }
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("does_not_exist").to_string_lossy().into_owned();
        assert!(load(&key).is_err());
    }
}
