//! Shapes demo: a global factory filled at load time, a recoverable service
//! singleton torn down and rebuilt, and trace callbacks printing what happens.
//!
//! Run with `cargo run --example shapes`.

use singleton_factory::{define_factory, define_singleton, register_product};

pub trait Shape: Send + Sync {
    fn describe(&self) -> String;
}

#[derive(Default)]
pub struct Circle;

impl Shape for Circle {
    fn describe(&self) -> String {
        "a circle".to_string()
    }
}

pub struct Polygon {
    sides: u32,
}

impl Shape for Polygon {
    fn describe(&self) -> String {
        format!("a polygon with {} sides", self.sides)
    }
}

/// Something expensive that the demo wants to rebuild on demand.
pub struct Canvas {
    width: u32,
    height: u32,
}

define_factory!(shapes: dyn Shape);
register_product!(shapes, Circle);
register_product!(shapes, "triangle" => Polygon { sides: 3 });
register_product!(shapes, "hexagon" => Polygon { sides: 6 });

define_singleton!(recoverable canvas: Canvas);

fn main() {
    shapes::factory().set_trace_callback(|event| println!("[factory] {event}"));
    canvas::holder().set_trace_callback(|event| println!("[canvas] {event}"));

    println!("registered: {:?}", shapes::keys());

    for key in ["Circle", "triangle", "hexagon", "octagon"] {
        match shapes::create_shared(key) {
            Ok(shape) => println!("{key}: {}", shape.describe()),
            Err(err) => println!("{key}: {err}"),
        }
    }

    {
        let _teardown = canvas::teardown_guard();
        let c = canvas::instance(|| Canvas {
            width: 640,
            height: 480,
        });
        println!("canvas {}x{} ({})", c.width, c.height, canvas::state());
    }
    println!("canvas is {}", canvas::state());

    let c = canvas::instance(|| Canvas {
        width: 1920,
        height: 1080,
    });
    println!(
        "canvas {}x{} ({}, generation {})",
        c.width,
        c.height,
        canvas::state(),
        canvas::holder().generation()
    );
}
