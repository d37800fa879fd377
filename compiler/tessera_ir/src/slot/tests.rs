use std::collections::HashSet;

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn first_auto_slot_starts_above_reserved_range() {
    let mut slots = SlotAllocator::default();
    let s = slots.allocate(None).unwrap();
    assert_eq!(s.id(), NUM_SLOTS);
    assert!(!s.is_reserved());
}

#[test]
fn auto_slots_are_strictly_increasing() {
    let mut slots = SlotAllocator::new(4);
    let ids: Vec<u32> = (0..5).map(|_| slots.fresh().unwrap().id()).collect();
    assert_eq!(ids, vec![4, 5, 6, 7, 8]);
    assert_eq!(slots.auto_count(), 5);
}

#[test]
fn reserved_range_bounds() {
    let mut slots = SlotAllocator::default();

    let low = slots.allocate(Some(0)).unwrap();
    assert_eq!(low.id(), 0);
    assert!(low.is_reserved());

    let high = slots.allocate(Some(i64::from(NUM_SLOTS) - 1)).unwrap();
    assert_eq!(high.id(), NUM_SLOTS - 1);
    assert!(high.is_reserved());
}

#[test]
fn reserved_out_of_range_is_input_error() {
    let mut slots = SlotAllocator::default();

    for bad in [-1, i64::from(NUM_SLOTS), i64::MAX, i64::MIN] {
        let err = slots.allocate(Some(bad)).unwrap_err();
        assert_eq!(
            err,
            CompileError::InvalidSlotId {
                requested: bad,
                num_slots: NUM_SLOTS,
            }
        );
        assert_eq!(err.kind(), crate::ErrorKind::Input);
    }
    assert!(slots.allocated().is_empty());
}

#[test]
fn rejected_request_does_not_advance_counter() {
    let mut slots = SlotAllocator::new(8);
    let _ = slots.allocate(Some(8));
    assert_eq!(slots.fresh().unwrap().id(), 8);
}

#[test]
fn fresh_allocators_do_not_share_a_counter() {
    let mut first = SlotAllocator::default();
    first.fresh().unwrap();
    first.fresh().unwrap();

    let mut second = SlotAllocator::default();
    assert_eq!(second.fresh().unwrap().id(), NUM_SLOTS);
}

#[test]
fn slot_identity_is_the_id() {
    let mut slots = SlotAllocator::default();
    let a = slots.allocate(Some(3)).unwrap();
    let b = slots.allocate(Some(3)).unwrap();
    assert_eq!(a, b);

    let set: HashSet<Slot> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn slot_display() {
    let mut slots = SlotAllocator::default();
    assert_eq!(slots.fresh().unwrap().to_string(), "slot#256");
}

mod proptest_allocation {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn reserved_and_auto_ids_are_disjoint(
            requests in proptest::collection::vec(
                prop_oneof![Just(None), (0i64..i64::from(NUM_SLOTS)).prop_map(Some)],
                0..64,
            )
        ) {
            let mut slots = SlotAllocator::default();
            let mut reserved = HashSet::new();
            let mut auto = Vec::new();

            for request in requests {
                let slot = slots.allocate(request).unwrap();
                if slot.is_reserved() {
                    reserved.insert(slot.id());
                } else {
                    auto.push(slot.id());
                }
            }

            for id in &auto {
                prop_assert!(!reserved.contains(id), "auto id {} collides with reserved", id);
            }
            for pair in auto.windows(2) {
                prop_assert!(pair[0] < pair[1], "auto ids not increasing: {:?}", pair);
            }
        }
    }
}
