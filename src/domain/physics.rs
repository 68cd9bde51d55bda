/// Collision layer: the player/obstacle overlap predicate.
///
/// ## Overlap Specification
///
/// The player HITS an obstacle iff ALL of:
///   - player right edge  >  obstacle left edge
///   - player left edge   <  obstacle right edge
///   - player bottom edge >  obstacle top edge
///
/// There is no "player top < obstacle bottom" term: obstacles sit on the
/// ground and the player can never be below it, so vertical intrusion from
/// above is the only case. All comparisons are strict: touching edges do
/// not collide.

use super::entity::{Obstacle, Player, Rect};

/// Raw predicate over two boxes (player box first).
#[inline]
pub fn overlaps(player: Rect, obstacle: Rect) -> bool {
    player.right() > obstacle.x
        && player.x < obstacle.right()
        && player.bottom() > obstacle.y
}

/// Does the player touch this obstacle right now?
#[inline]
pub fn hits(player: &Player, obstacle: &Obstacle) -> bool {
    overlaps(player.rect(), obstacle.rect())
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
