use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::mask::SpriteSet;
use crate::obstacle::Obstacle;
use crate::physics::Agent;

/// Which piece of an obstacle was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Piece {
    Top,
    Bottom,
}

/// Snap a world coordinate to the pixel grid, ties to even.
fn to_pixel(v: f32) -> i32 {
    v.round_ties_even() as i32
}

/// Mask offsets of the top and bottom pieces relative to the agent sprite.
pub fn piece_offsets(agent: &Agent, obstacle: &Obstacle) -> [(Piece, (i32, i32)); 2] {
    let dx = to_pixel(obstacle.x - agent.x());
    let agent_y = to_pixel(agent.y);
    [
        (Piece::Bottom, (dx, to_pixel(obstacle.bottom) - agent_y)),
        (Piece::Top, (dx, to_pixel(obstacle.top) - agent_y)),
    ]
}

/// Exact silhouette test of an agent's current wing frame against both pieces
/// of an obstacle. Returns the first piece found overlapping.
pub fn check_obstacle(agent: &Agent, obstacle: &Obstacle, sprites: &SpriteSet) -> Option<Piece> {
    let agent_mask = sprites.agent_frame(agent.frame);
    piece_offsets(agent, obstacle)
        .into_iter()
        .find(|(piece, offset)| {
            let mask = match piece {
                Piece::Top => &sprites.obstacle_top,
                Piece::Bottom => &sprites.obstacle_bottom,
            };
            agent_mask.overlaps(mask, *offset)
        })
        .map(|(piece, _)| piece)
}

pub fn collides(agent: &Agent, obstacle: &Obstacle, sprites: &SpriteSet) -> bool {
    check_obstacle(agent, obstacle, sprites).is_some()
}

/// Whether the agent sank into the floor or rose above the ceiling.
pub fn out_of_bounds(agent: &Agent, config: &SimConfig) -> bool {
    let field = &config.playfield;
    agent.y + config.agent.height as f32 - field.floor_margin >= field.floor_y
        || agent.y < field.ceiling_y
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::Mask;

    fn setup() -> (SimConfig, SpriteSet) {
        let config = SimConfig::default();
        let sprites = SpriteSet::from_config(&config);
        (config, sprites)
    }

    #[test]
    fn agent_in_gap_is_clear() {
        let (config, sprites) = setup();
        let agent = Agent::new(0, 230.0, 320.0);
        // Gap spans 250..450, agent spans 320..368.
        let o = Obstacle::with_gap_center(220.0, 250.0, &config.obstacles);
        assert!(!collides(&agent, &o, &sprites));
    }

    #[test]
    fn agent_inside_bottom_piece_hits() {
        let (config, sprites) = setup();
        let agent = Agent::new(0, 230.0, 440.0);
        let o = Obstacle::with_gap_center(220.0, 250.0, &config.obstacles);
        assert_eq!(check_obstacle(&agent, &o, &sprites), Some(Piece::Bottom));
    }

    #[test]
    fn agent_inside_top_piece_hits() {
        let (config, sprites) = setup();
        let agent = Agent::new(0, 230.0, 210.0);
        let o = Obstacle::with_gap_center(220.0, 250.0, &config.obstacles);
        assert_eq!(check_obstacle(&agent, &o, &sprites), Some(Piece::Top));
    }

    #[test]
    fn obstacle_far_right_never_hits() {
        let (config, sprites) = setup();
        let agent = Agent::new(0, 230.0, 440.0);
        let o = Obstacle::with_gap_center(400.0, 250.0, &config.obstacles);
        assert!(!collides(&agent, &o, &sprites));
    }

    #[test]
    fn silhouette_not_bounding_box() {
        let (config, sprites) = setup();
        // Bottom piece's top-left corner at (0, 450); the agent's box ends at (2, 452).
        let o = Obstacle::with_gap_center(0.0, 250.0, &config.obstacles);
        let agent = Agent::new(0, -66.0, 404.0);

        let agent_right = agent.x() + config.agent.width as f32;
        let agent_bottom = agent.y + config.agent.height as f32;
        assert!(agent_right > o.x && agent_bottom > o.bottom, "boxes overlap");
        assert!(!collides(&agent, &o, &sprites));
    }

    #[test]
    fn half_pixel_rounds_to_even() {
        let config = SimConfig::default();
        let agent = Agent::new(0, 230.0, 354.5);
        let o = Obstacle::with_gap_center(230.0, 250.0, &config.obstacles);
        let [(_, bottom), _] = piece_offsets(&agent, &o);
        // 354.5 snaps to 354, so the bottom piece sits 450 - 354 = 96 below.
        assert_eq!(bottom, (0, 96));
    }

    #[test]
    fn collision_uses_current_wing_frame() {
        let config = SimConfig::default();
        let procedural = SpriteSet::from_config(&config);
        // Frame 1 is a solid box; frames 0 and 2 keep the rounded silhouette.
        let frames = vec![
            procedural.agent_frame(0).clone(),
            Mask::from_fn(68, 48, |_, _| true),
            procedural.agent_frame(2).clone(),
        ];
        let sprites = SpriteSet::new(frames, procedural.obstacle_bottom.clone()).unwrap();

        // Boxes overlap on the cap's flat top edge, clear of the body and beak.
        let o = Obstacle::with_gap_center(0.0, 250.0, &config.obstacles);
        let mut agent = Agent::new(0, -60.0, 404.0);
        assert!(!collides(&agent, &o, &sprites));
        agent.frame = 1;
        assert!(collides(&agent, &o, &sprites));
        agent.frame = 2;
        assert!(!collides(&agent, &o, &sprites));
    }

    #[test]
    fn floor_and_ceiling_bounds() {
        let config = SimConfig::default();
        // 692 + 48 - 10 = 730
        assert!(out_of_bounds(&Agent::new(0, 230.0, 692.0), &config));
        assert!(!out_of_bounds(&Agent::new(0, 230.0, 691.9), &config));
        assert!(out_of_bounds(&Agent::new(0, 230.0, -50.1), &config));
        assert!(!out_of_bounds(&Agent::new(0, 230.0, -50.0), &config));
    }
}
