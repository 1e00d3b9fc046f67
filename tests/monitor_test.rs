//! Integration tests for the blocking monitor loop

use memscan::memory::SimulatedProvider;
use memscan::{
    Address, MemoryError, MonitorDecision, MonitorOptions, MonitorOutcome, ScanValue, Scanner,
    Tally,
};
use pretty_assertions::assert_eq;
use std::thread;
use std::time::{Duration, Instant};

const PID: u32 = 77;
const BASE: Address = Address::new(0x4000);

fn provider(slots: usize, value: i32) -> SimulatedProvider {
    let provider = SimulatedProvider::new();
    provider
        .add_process(PID, "monitored.exe")
        .map_region(PID, BASE, slots * 4);
    for i in 0..slots {
        provider.poke(PID, BASE.offset(i * 4), value).unwrap();
    }
    provider
}

/// Pokes `value` at `address` once the monitor has issued `reads` reads
fn poke_after_reads(provider: &SimulatedProvider, reads: usize, address: Address, value: i32) -> thread::JoinHandle<()> {
    let provider = provider.clone();
    thread::spawn(move || {
        let deadline = Instant::now() + Duration::from_secs(10);
        while provider.stats().reads < reads && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        provider.poke(PID, address, value).unwrap();
    })
}

#[test]
fn test_monitor_narrows_and_stops() {
    let provider = provider(2, 100);
    let mut scanner = Scanner::open(provider.clone(), PID).unwrap();
    let mut session = scanner.scan(ScanValue::Integer32(100)).unwrap();

    // First poll reads both slots, then the second slot changes
    let reads = provider.stats().reads;
    let poker = poke_after_reads(&provider, reads + 2, BASE.offset(4), 105);

    let mut changes = Vec::new();
    let options = MonitorOptions {
        min_addresses_to_exit: 10,
        interval: Duration::from_millis(2),
    };
    let outcome = session
        .monitor(&options, |values: &[ScanValue], tally: &Tally| {
            changes.push((values.to_vec(), tally.clone()));
            (true, ScanValue::Integer32(105))
        })
        .unwrap();
    poker.join().unwrap();

    assert_eq!(changes.len(), 1);
    assert_eq!(
        changes[0].0,
        vec![ScanValue::Integer32(100), ScanValue::Integer32(105)]
    );
    assert_eq!(
        changes[0].1,
        Tally::from_values(&[ScanValue::Integer32(100), ScanValue::Integer32(105)])
    );
    assert_eq!(outcome.narrowings, 1);
    assert_eq!(outcome.remaining, 1);
    assert!(outcome.polls >= 2);
    assert_eq!(session.address_list().unwrap(), &["0x4004"]);
}

#[test]
fn test_monitor_keeps_until_narrowed() {
    let provider = provider(3, 1);
    let mut scanner = Scanner::open(provider.clone(), PID).unwrap();
    let mut session = scanner.scan(ScanValue::Integer32(1)).unwrap();

    let reads = provider.stats().reads;
    let first = poke_after_reads(&provider, reads + 3, BASE, 2);

    let mut calls = 0;
    let options = MonitorOptions {
        min_addresses_to_exit: 3,
        interval: Duration::from_millis(2),
    };
    let outcome = session
        .monitor(&options, |_: &[ScanValue], _: &Tally| {
            calls += 1;
            if calls == 1 {
                // Declined; the next change comes from a second poke
                let _ = poke_after_reads(&provider, 0, BASE.offset(8), 3);
                MonitorDecision::Keep
            } else {
                MonitorDecision::Narrow(ScanValue::Integer32(1))
            }
        })
        .unwrap();
    first.join().unwrap();

    assert_eq!(calls, 2);
    assert_eq!(
        outcome,
        MonitorOutcome {
            polls: outcome.polls,
            narrowings: 1,
            remaining: 1,
        }
    );
    assert_eq!(session.addresses().unwrap(), &[BASE.offset(4)]);
}

#[test]
fn test_monitor_fails_when_process_exits() {
    let provider = provider(2, 9);
    let mut scanner = Scanner::open(provider.clone(), PID).unwrap();
    let mut session = scanner.scan(ScanValue::Integer32(9)).unwrap();

    let killer = {
        let provider = provider.clone();
        let reads = provider.stats().reads + 2;
        thread::spawn(move || {
            while provider.stats().reads < reads {
                thread::sleep(Duration::from_millis(1));
            }
            provider.kill_process(PID);
        })
    };

    let options = MonitorOptions {
        min_addresses_to_exit: 1,
        interval: Duration::from_millis(2),
    };
    let err = session
        .monitor(&options, |_: &[ScanValue], _: &Tally| MonitorDecision::Keep)
        .unwrap_err();
    killer.join().unwrap();

    assert!(matches!(err, MemoryError::MemoryReadFailure { .. }));
    assert!(session.is_released());
    assert_eq!(provider.stats().live_buffers(), 0);
}
