//! Prints the surface list of an OBJ room model.
//!
//! Usage: `cargo run --example surface_report -- room.obj [options.json]`
//!
//! Set `RUST_LOG=debug` to see loader and picking traces.

use roomscope::{loader, Options, Ray, Vec3, Viewer};

fn main() -> roomscope::Result<()> {
    roomscope::init_logging();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: surface_report <model.obj> [options.json]");
        std::process::exit(2);
    };
    let options = match args.next() {
        Some(options_path) => Options::load(options_path)?,
        None => Options::default(),
    };

    let scene = loader::load_obj(&path, path.clone())?;
    let mut viewer = Viewer::new(options);
    let session = viewer.load_scene(scene);

    println!("model: {}", session.scene().model_id());
    println!("loaded at: {}", session.scene().loaded_at().to_rfc3339());
    println!();
    println!(
        "{:>4}  {:<24} {:<16} {:>7} {:>10} {:>10}",
        "#", "label", "id", "faces", "area", "volume"
    );
    for surface in session.surfaces() {
        println!(
            "{:>4}  {:<24} {:<16} {:>7} {:>10.3} {:>10.3}",
            surface.display_index,
            surface.label(),
            surface.id.as_str(),
            surface.face_count,
            surface.area,
            surface.volume
        );
    }
    println!();
    println!("total area: {:.3}", session.total_area());

    // Pick straight down through the center of the first surface's bounds.
    let center = session
        .surfaces()
        .first()
        .and_then(|surface| surface.bounding_box)
        .map(|bounds| bounds.center);
    if let Some(center) = center {
        let ray = Ray::new(center + Vec3::Y * 100.0, Vec3::NEG_Y);
        viewer.click(ray.as_ref(), &mut roomscope::NoMarkers);
        match viewer.selected_surface() {
            Some(surface) => println!("picked from above center: {}", surface.label()),
            None => println!("nothing picked from above center"),
        }
    }

    Ok(())
}
