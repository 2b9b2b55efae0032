//! Line-of-sight and fog of war.
//!
//! [`is_visible`] draws a straight line between the centres of two cells and
//! asks whether every cell the line crosses is transparent. Only room floor is
//! transparent, so corridors are seen one cell at a time.
//!
//! The line is sampled twice: once at every integer column strictly between
//! the endpoints, once at every integer row. A sample that lands exactly on a
//! cell needs that cell to be floor. A sample that falls between two cells is
//! blocked only when both neighbours are opaque.
//!
//! All sampling is exact integer arithmetic, so the answer never depends on
//! floating point rounding.

use super::grid::{Grid, Position, Symbol};

/// Whether `target` can be seen from `observer` on `terrain`.
pub fn is_visible(terrain: &Grid, observer: Position, target: Position) -> bool {
    let (or, oc) = (observer.0 as i64, observer.1 as i64);
    let (tr, tc) = (target.0 as i64, target.1 as i64);

    if oc == tc {
        return strictly_between(or, tr).all(|row| transparent(terrain, row, oc));
    }
    if or == tr {
        return strictly_between(oc, tc).all(|col| transparent(terrain, or, col));
    }

    let column_scan_clear = strictly_between(oc, tc).all(|col| {
        let (lo, exact) = crossing(or, tr - or, col - oc, tc - oc);
        sample_clear(exact, transparent(terrain, lo, col), || {
            transparent(terrain, lo + 1, col)
        })
    });
    column_scan_clear
        && strictly_between(or, tr).all(|row| {
            let (lo, exact) = crossing(oc, tc - oc, row - or, tr - or);
            sample_clear(exact, transparent(terrain, row, lo), || {
                transparent(terrain, row, lo + 1)
            })
        })
}

/// Rebuild `viewer` for an observer standing at `observer`.
///
/// Visible cells copy the live grid. Cells out of sight fall back to the
/// static terrain if the viewer had seen them before, so gold and other
/// players fade from memory while walls and floors stay remembered.
pub fn recompute_visibility(terrain: &Grid, live: &Grid, viewer: &mut Grid, observer: Position) {
    debug_assert_eq!((terrain.rows(), terrain.cols()), (live.rows(), live.cols()));
    debug_assert_eq!((terrain.rows(), terrain.cols()), (viewer.rows(), viewer.cols()));

    for (row, col) in terrain.positions() {
        if is_visible(terrain, observer, (row, col)) {
            if let Some(now) = live.get(row, col) {
                viewer.set(row, col, now);
            }
            continue;
        }
        match viewer.get(row, col) {
            None | Some(Symbol::Wall) => {}
            // Anything else was seen before, including a marker left at our
            // previous position.
            Some(_) => {
                if let Some(remembered) = terrain.get(row, col) {
                    viewer.set(row, col, remembered);
                }
            }
        }
    }
    viewer.set(observer.0, observer.1, Symbol::SelfMarker);
}

fn strictly_between(a: i64, b: i64) -> std::ops::Range<i64> {
    a.min(b) + 1..a.max(b)
}

/// Where the line `base + rise * run / span` lands: the floor coordinate and
/// whether it is exact.
fn crossing(base: i64, rise: i64, run: i64, span: i64) -> (i64, bool) {
    let (mut num, mut den) = (rise * run, span);
    if den < 0 {
        num = -num;
        den = -den;
    }
    (base + num.div_euclid(den), num.rem_euclid(den) == 0)
}

fn sample_clear(exact: bool, lower_clear: bool, upper_clear: impl FnOnce() -> bool) -> bool {
    if exact {
        lower_clear
    } else {
        lower_clear || upper_clear()
    }
}

fn transparent(terrain: &Grid, row: i64, col: i64) -> bool {
    if row < 0 || col < 0 {
        return false;
    }
    matches!(terrain.get(row as usize, col as usize), Some(s) if s.is_transparent())
}
