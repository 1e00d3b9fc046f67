//! Property tests for candidate narrowing

use memscan::memory::SimulatedProvider;
use memscan::{Address, ScanValue, Scanner, ValueType};
use proptest::prelude::*;

const PID: u32 = 9;
const BASE: Address = Address::new(0x1_0000);

fn provider(values: &[i32]) -> SimulatedProvider {
    let provider = SimulatedProvider::new();
    provider
        .add_process(PID, "prop.exe")
        .map_region(PID, BASE, values.len() * 4);
    for (i, value) in values.iter().enumerate() {
        provider.poke(PID, BASE.offset(i * 4), *value).unwrap();
    }
    provider
}

proptest! {
    #[test]
    fn initial_scan_finds_exactly_the_matching_slots(
        values in prop::collection::vec(0i32..4, 1..64),
        target in 0i32..4,
    ) {
        let provider = provider(&values);
        let mut scanner = Scanner::open(provider, PID).unwrap();
        let session = scanner.scan(ScanValue::Integer32(target)).unwrap();

        let expected: Vec<Address> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == target)
            .map(|(i, _)| BASE.offset(i * 4))
            .collect();
        prop_assert_eq!(session.addresses().unwrap(), expected.as_slice());
    }

    #[test]
    fn rescans_only_ever_shrink_and_keep_order(
        values in prop::collection::vec(0i32..3, 1..48),
        rounds in prop::collection::vec((prop::collection::vec(0i32..3, 48), 0i32..3), 1..5),
    ) {
        let provider = provider(&values);
        let mut scanner = Scanner::open(provider.clone(), PID).unwrap();
        let mut session = scanner.scan(ScanValue::Integer32(values[0])).unwrap();

        for (updates, target) in rounds {
            let before: Vec<Address> = session.addresses().unwrap().to_vec();
            for (i, value) in updates.iter().take(values.len()).enumerate() {
                provider.poke(PID, BASE.offset(i * 4), *value).unwrap();
            }

            session.rescan(ScanValue::Integer32(target)).unwrap();
            let after = session.addresses().unwrap();

            // Subsequence of the previous set, every survivor holding the target
            let mut remaining = before.iter();
            for address in after {
                prop_assert!(remaining.any(|a| a == address));
                prop_assert_eq!(
                    provider.peek(PID, *address, ValueType::Integer32),
                    Some(ScanValue::Integer32(target))
                );
            }
            let listed = session.address_list().unwrap();
            prop_assert_eq!(listed.len(), after.len());
            for (text, address) in listed.iter().zip(after) {
                prop_assert_eq!(text, &address.to_hex_string());
            }
        }
    }
}
