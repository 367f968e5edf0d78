use phoenix::errors::PhoenixResult;
use phoenix_int_test::test_util::{cleanup, create_test_context};
use std::sync::{Arc, Barrier};
use std::thread;

fn main() -> PhoenixResult<()> {
    println!("Starting connection cache stress test...");
    let ctx = create_test_context()?;

    let threads = 16;
    let lookups = 100_000;
    let profiles = ["Test2", "main", "files"];
    let barrier = Arc::new(Barrier::new(threads));

    let start = std::time::Instant::now();
    let handles: Vec<_> = (0..threads)
        .map(|thread_id| {
            let manager = ctx.manager();
            let barrier = barrier.clone();
            thread::spawn(move || -> PhoenixResult<()> {
                barrier.wait();
                for i in 0..lookups {
                    let id = profiles[(thread_id + i) % profiles.len()];
                    manager.get_database_by_id(id)?;
                }
                Ok(())
            })
        })
        .collect();

    for handle in handles {
        match handle.join() {
            Ok(result) => result?,
            Err(_) => println!("Worker thread panicked"),
        }
    }
    let elapsed = start.elapsed();

    println!(
        "Resolved {} database handles in {:?} with {} client(s) created",
        threads * lookups,
        elapsed,
        ctx.driver().connection_count()
    );

    cleanup(ctx)
}
