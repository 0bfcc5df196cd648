//! Example that demonstrates the usage shown in the README.md file.
//!
//! This shows the fixed, growable, tagged and scope-managed pools side by side.

use block_pool::{Error, FixedPool, GrowablePool, LocalPool, TaggedPool, tagged_union};
use new_zealand::nz;

tagged_union! {
    #[derive(Debug)]
    enum Shape {
        Circle(f64),
        Label(String),
    }
}

fn main() -> Result<(), Error> {
    println!("=== Block Pool README Example ===");

    // A fixed pool never grows; it reports exhaustion instead.
    let mut sessions = FixedPool::<String>::with_capacity(nz!(2))?;

    let alice = sessions.allocate("Alice".to_string())?;
    let bob = sessions.allocate("Bob".to_string())?;

    match sessions.allocate("Charlie".to_string()) {
        Err(error) => println!("Third session rejected: {error}"),
        Ok(_) => unreachable!("the pool only has room for two sessions"),
    }

    // Freed slots are reused, and stale handles are caught.
    sessions.free(bob);
    let charlie = sessions.allocate("Charlie".to_string())?;

    if let Err(error) = sessions.get(bob) {
        println!("Stale handle detected: {error}");
    }

    sessions.get_mut(alice)?.push_str(" Smith");
    println!(
        "Live sessions: {}, {}",
        sessions.get(alice)?,
        sessions.get(charlie)?
    );

    // A growable pool doubles when it runs out of room; handles survive the move.
    let mut readings = GrowablePool::<u64>::with_capacity(nz!(4))?;
    let handles = (0..10_u64)
        .map(|value| readings.allocate(value * 10))
        .collect::<Result<Vec<_>, _>>()?;

    println!(
        "Readings pool grew to {} slots after {} relocations",
        readings.size(),
        readings.relocations()
    );
    println!("Last reading: {}", readings.get(handles[9])?);

    // A tagged pool stores any member of a closed set of types.
    let mut shapes = TaggedPool::<Shape>::with_capacity(nz!(2))?;
    let circle = shapes.allocate(1.5_f64)?;
    let label = shapes.allocate("origin".to_string())?;
    println!(
        "Circle radius {} labelled {}",
        shapes.get(circle)?,
        shapes.get(label)?
    );

    // A local pool frees items when their owning handle goes out of scope.
    let scratch = LocalPool::<Vec<u8>>::with_capacity(nz!(1))?;
    {
        let mut buffer = scratch.allocate(Vec::new())?;
        buffer.with_mut(|bytes| bytes.extend_from_slice(b"temporary"))?;
        println!("Scratch items while in scope: {}", scratch.allocated());
    }
    println!("Scratch items after scope: {}", scratch.allocated());

    println!("README example completed successfully!");

    Ok(())
}
