use super::*;

#[test]
fn wheel_always_has_base_alphabet_then_accent() {
    for slot in 0..8 {
        let wheel = Wheel::build(SlotIndex(slot), "math");
        assert_eq!(wheel.symbols().len(), WHEEL_SIZE);
        let base: String = wheel.symbols()[..BASE_LEN].iter().collect();
        assert_eq!(base, BASE_CHARSET);
    }
}

#[test]
fn accent_comes_from_first_word_uppercased() {
    assert_eq!(Wheel::build(SlotIndex(0), "cat").accent(), 'C');
    assert_eq!(Wheel::build(SlotIndex(1), "cat").accent(), 'A');
    assert_eq!(Wheel::build(SlotIndex(2), "cat").accent(), 'T');
}

#[test]
fn accent_is_blank_past_end_of_first_word() {
    let wheel = Wheel::build(SlotIndex(5), "cat");
    assert_eq!(wheel.accent(), ' ');
    assert!(!wheel.is_accent_match(' '));
}

#[test]
fn accent_flag_wins_over_letter_value() {
    assert_eq!(locate('C', true), ACCENT_INDEX);
    assert_eq!(locate('Z', true), ACCENT_INDEX);
    assert_eq!(locate('C', false), 3);
}

#[test]
fn locate_maps_base_alphabet_and_defaults_unknown_to_blank() {
    assert_eq!(locate(' ', false), 0);
    assert_eq!(locate('A', false), 1);
    assert_eq!(locate('D', false), 4);
    assert_eq!(locate('Z', false), 26);
    assert_eq!(locate('7', false), 0);
    assert_eq!(locate('é', false), 0);
}

#[test]
fn hop_count_is_zero_only_for_equal_positions() {
    for from in 0..WHEEL_SIZE {
        for to in 0..WHEEL_SIZE {
            let hops = hop_count(from, to);
            if from == to {
                assert_eq!(hops, 0);
            } else {
                assert!((1..WHEEL_SIZE).contains(&hops), "{from}->{to} gave {hops}");
                assert_eq!((from + hops) % WHEEL_SIZE, to);
            }
        }
    }
}

#[test]
fn hop_count_wraps_forward_through_accent() {
    assert_eq!(hop_count(27, 4), 5);
    assert_eq!(hop_count(4, 3), 27);
    assert_eq!(hop_count(3, 27), 24);
}

#[test]
fn next_index_wraps_after_accent() {
    assert_eq!(next_index(0), 1);
    assert_eq!(next_index(26), 27);
    assert_eq!(next_index(27), 0);
}

#[test]
fn stepping_hop_count_times_reaches_target() {
    let wheel = Wheel::build(SlotIndex(0), "cat");
    let from = locate('C', true);
    let to = locate('D', false);
    let mut position = from;
    let mut visited = Vec::new();
    for _ in 0..hop_count(from, to) {
        position = next_index(position);
        visited.push(wheel.symbol(position));
    }
    assert_eq!(position, to);
    assert_eq!(visited, vec![' ', 'A', 'B', 'C', 'D']);
}
