/// Uparrow character unicode
pub const UPARROW: char = match std::char::from_u32(0x00002191) {
    Some(v) => v,
    None => panic!("Invalid unicode character uparrow"),
};
/// Downarrow character unicode
pub const DOWNARROW: char = match std::char::from_u32(0x00002193) {
    Some(v) => v,
    None => panic!("Invalid unicode character downarrow"),
};
/// Updownarrow character unicode, a doubly occupied slot.
pub const UPDOWNARROW: char = match std::char::from_u32(0x00002195) {
    Some(v) => v,
    None => panic!("Invalid unicode character updownarrow"),
};
/// Empty slot marker.
pub const EMPTY: char = '0';

/// Renders an occupation pattern, one character per slot, lowest slot first.
pub fn render_slots(up: u64, down: u64, nslots: usize) -> String {
    let mut out = String::with_capacity(nslots);
    for slot in 0..nslots {
        let mask = 1u64 << slot;
        let c = match (up & mask != 0, down & mask != 0) {
            (true, true) => UPDOWNARROW,
            (true, false) => UPARROW,
            (false, true) => DOWNARROW,
            (false, false) => EMPTY,
        };
        out.push(c);
    }
    out
}
