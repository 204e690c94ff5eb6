pub mod fixtures;

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use notiq::{EventQueue, Tag};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    const ROUNDS: u32 = 1000;
    const INITIAL_SPEED: u32 = 1;
    const INITIAL_ALTITUDE: u32 = 2001;

    /// Two flooding producers, a third producer churning registration, and a
    /// fourth thread churning throwaway listeners, all concurrent. Per-tag
    /// FIFO order must survive, and the throwaway listener must never fire.
    #[test]
    fn test_concurrent_flood_with_registry_churn() {
        init_tracing();
        let queue = Arc::new(EventQueue::<&str, u32>::new());

        let speed_log = Recorder::new();
        let altitude_log = Recorder::new();
        let throwaway_fired = Arc::new(AtomicBool::new(false));

        queue.listen(Tag::new("speed"), speed_log.callback()).unwrap();
        queue.listen(Tag::new("altitude"), altitude_log.callback()).unwrap();

        let barrier = Arc::new(Barrier::new(4));
        let mut workers = Vec::new();

        {
            let queue = Arc::clone(&queue);
            let barrier = Arc::clone(&barrier);
            workers.push(thread::spawn(move || {
                let provider = queue.provide(Tag::new("speed"));
                barrier.wait();
                for value in INITIAL_SPEED..INITIAL_SPEED + ROUNDS {
                    provider.update(value);
                }
            }));
        }

        {
            let queue = Arc::clone(&queue);
            let barrier = Arc::clone(&barrier);
            workers.push(thread::spawn(move || {
                let provider = queue.provide(Tag::new("altitude"));
                barrier.wait();
                for value in INITIAL_ALTITUDE..INITIAL_ALTITUDE + ROUNDS {
                    provider.update(value);
                }
            }));
        }

        {
            let queue = Arc::clone(&queue);
            let barrier = Arc::clone(&barrier);
            workers.push(thread::spawn(move || {
                barrier.wait();
                for _ in 0..ROUNDS {
                    let provider = queue.provide(Tag::new("transient"));
                    provider.update(3);
                }
            }));
        }

        {
            let queue = Arc::clone(&queue);
            let barrier = Arc::clone(&barrier);
            let fired = Arc::clone(&throwaway_fired);
            workers.push(thread::spawn(move || {
                barrier.wait();
                for _ in 0..ROUNDS {
                    let fired = Arc::clone(&fired);
                    let token = queue
                        .listen(Tag::new("throwaway"), move |_| {
                            fired.store(true, Ordering::SeqCst);
                        })
                        .unwrap();
                    queue.remove_listener(token).unwrap();
                }
            }));
        }

        for worker in workers {
            worker.join().unwrap();
        }
        queue.wait_until_empty().unwrap();

        let expected_speed: Vec<u32> = (INITIAL_SPEED..INITIAL_SPEED + ROUNDS).collect();
        let expected_altitude: Vec<u32> = (INITIAL_ALTITUDE..INITIAL_ALTITUDE + ROUNDS).collect();
        assert_eq!(speed_log.values(), expected_speed);
        assert_eq!(altitude_log.values(), expected_altitude);
        assert!(!throwaway_fired.load(Ordering::SeqCst));
    }
}
