//! XDMF+HDF5 snapshot output (§6 "Output format"). Each output interval
//! produces a sibling pair: `<key>_NNNN.hdf5` carrying the raw per-particle
//! datasets, and `<key>_NNNN.xmf` — a small, fixed-shape XDMF 2.0 document
//! referencing them for visualization — built with `std::fmt::Write` rather
//! than a templating crate, since its shape never varies.

use std::fmt::Write as _;
use std::fs;

use hdf5::File;

use crate::particle::Particle;
use crate::vector::Vec3;

/// Writes `<file_key>_<step:04>.hdf5` and the matching `.xmf` sidecar for one
/// output interval (§4.G step 12, §6).
pub fn write_snapshot(
    particles: &[Particle],
    file_key: &str,
    step: u64,
    rb_force: Vec3,
    rb_force_vis: Vec3,
) -> Result<(), Box<dyn std::error::Error>> {
    let stem = format!("{file_key}_{:04}", step % 10_000);
    let hdf5_name = format!("{stem}.hdf5");

    let np = particles.len();
    let mut position = Vec::with_capacity(3 * np);
    let mut velocity = Vec::with_capacity(3 * np);
    let mut pressure = Vec::with_capacity(np);
    let mut density = Vec::with_capacity(np);
    let mut mass = Vec::with_capacity(np);
    let mut h = Vec::with_capacity(np);
    let mut tag = Vec::with_capacity(np);
    let mut is_free = Vec::with_capacity(np);

    for p in particles {
        position.push(p.x.x as f32);
        position.push(p.x.y as f32);
        position.push(p.x.z as f32);
        velocity.push(p.v.x as f32);
        velocity.push(p.v.y as f32);
        velocity.push(p.v.z as f32);
        pressure.push(p.pressure as f32);
        density.push(p.density as f32);
        mass.push(p.mass as f32);
        h.push(p.h as f32);
        tag.push(p.id);
        is_free.push(if p.is_free { 1i32 } else { 0i32 });
    }
    let rigid_body_force: Vec<f32> = [
        rb_force.x as f32,
        rb_force.y as f32,
        rb_force.z as f32,
        rb_force_vis.x as f32,
        rb_force_vis.y as f32,
        rb_force_vis.z as f32,
    ]
    .to_vec();

    let file = File::create(&hdf5_name)?;
    file.new_dataset_builder()
        .with_data(&[np as i32][..])
        .create("NP")?;
    file.new_dataset_builder()
        .with_data(&position[..])
        .create("Position")?;
    file.new_dataset_builder()
        .with_data(&velocity[..])
        .create("Velocity")?;
    file.new_dataset_builder()
        .with_data(&pressure[..])
        .create("Pressure")?;
    file.new_dataset_builder()
        .with_data(&density[..])
        .create("Density")?;
    file.new_dataset_builder()
        .with_data(&mass[..])
        .create("Mass")?;
    file.new_dataset_builder().with_data(&h[..]).create("h")?;
    file.new_dataset_builder()
        .with_data(&tag[..])
        .create("Tag")?;
    file.new_dataset_builder()
        .with_data(&is_free[..])
        .create("IsFree")?;
    file.new_dataset_builder()
        .with_data(&rigid_body_force[..])
        .create("Rigid_Body_Force")?;
    file.flush()?;

    fs::write(format!("{stem}.xmf"), xdmf_document(&hdf5_name, np))?;
    Ok(())
}

fn xdmf_document(hdf5_name: &str, np: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "<?xml version=\"1.0\" ?>");
    let _ = writeln!(out, "<!DOCTYPE Xdmf SYSTEM \"Xdmf.dtd\" []>");
    let _ = writeln!(out, "<Xdmf Version=\"2.0\">");
    let _ = writeln!(out, " <Domain>");
    let _ = writeln!(out, "   <Grid Name=\"SPHCenter\" GridType=\"Uniform\">");
    let _ = writeln!(
        out,
        "     <Topology TopologyType=\"Polyvertex\" NumberOfElements=\"{np}\"/>"
    );
    let _ = writeln!(out, "     <Geometry GeometryType=\"XYZ\">");
    let _ = writeln!(
        out,
        "       <DataItem Format=\"HDF\" NumberType=\"Float\" Precision=\"4\" Dimensions=\"{np} 3\">"
    );
    let _ = writeln!(out, "        {hdf5_name}:/Position");
    let _ = writeln!(out, "       </DataItem>");
    let _ = writeln!(out, "     </Geometry>");
    write_vector_attribute(&mut out, hdf5_name, "Velocity", np);
    write_scalar_attribute(&mut out, hdf5_name, "Pressure", np);
    write_scalar_attribute(&mut out, hdf5_name, "Density", np);
    write_int_scalar_attribute(&mut out, hdf5_name, "Tag", np);
    let _ = writeln!(out, "   </Grid>");
    let _ = writeln!(out, " </Domain>");
    let _ = writeln!(out, "</Xdmf>");
    out
}

fn write_vector_attribute(out: &mut String, hdf5_name: &str, name: &str, np: usize) {
    let _ = writeln!(
        out,
        "     <Attribute Name=\"{name}\" AttributeType=\"Vector\" Center=\"Node\">"
    );
    let _ = writeln!(
        out,
        "       <DataItem Dimensions=\"{np} 3\" NumberType=\"Float\" Precision=\"4\" Format=\"HDF\">"
    );
    let _ = writeln!(out, "        {hdf5_name}:/{name}");
    let _ = writeln!(out, "       </DataItem>");
    let _ = writeln!(out, "     </Attribute>");
}

fn write_scalar_attribute(out: &mut String, hdf5_name: &str, name: &str, np: usize) {
    let _ = writeln!(
        out,
        "     <Attribute Name=\"{name}\" AttributeType=\"Scalar\" Center=\"Node\">"
    );
    let _ = writeln!(
        out,
        "       <DataItem Dimensions=\"{np}\" NumberType=\"Float\" Precision=\"4\" Format=\"HDF\">"
    );
    let _ = writeln!(out, "        {hdf5_name}:/{name}");
    let _ = writeln!(out, "       </DataItem>");
    let _ = writeln!(out, "     </Attribute>");
}

fn write_int_scalar_attribute(out: &mut String, hdf5_name: &str, name: &str, np: usize) {
    let _ = writeln!(
        out,
        "     <Attribute Name=\"{name}\" AttributeType=\"Scalar\" Center=\"Node\">"
    );
    let _ = writeln!(
        out,
        "       <DataItem Dimensions=\"{np}\" NumberType=\"Int\" Format=\"HDF\">"
    );
    let _ = writeln!(out, "        {hdf5_name}:/{name}");
    let _ = writeln!(out, "       </DataItem>");
    let _ = writeln!(out, "     </Attribute>");
}
