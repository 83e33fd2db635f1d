/// The step function: advances the session by one tick.
///
/// Processing order, each exactly once per tick:
///   1. Frame intents → hero (target velocity, jump trigger)
///   2. Horizontal kinematics → attempted displacement
///   3. Collision clamp + floor / contact classification, all against
///      the catalog's current (pre-scroll) geometry
///   4. Vertical jump kinematics
///   5. The single scroll application: the world moves by the negative
///      of the resolved displacement, keeping the hero at its anchor
///
/// Collision therefore always reconciles this tick's attempted motion
/// against last tick's region positions; no fixed-point iteration.

use crate::domain::hero::FrameInput;
use crate::domain::tile::TileType;
use crate::sim::event::GameEvent;
use crate::sim::world::{GameSession, Phase};

pub fn step(session: &mut GameSession, input: FrameInput) -> Vec<GameEvent> {
    if session.phase != Phase::Playing {
        return vec![];
    }

    let mut events: Vec<GameEvent> = Vec::new();
    session.tick += 1;

    // ── 1. Intents ──
    session.hero.apply(input.movement);
    if input.jump && session.hero.start_jump() {
        events.push(GameEvent::JumpStarted);
    }

    // ── 2–3. Horizontal: attempt, then clamp against current geometry ──
    let mut dx = 0.0;
    if session.hero.moving() {
        let attempted = session.hero.tick_horizontal();
        dx = session.resolver.resolve_horizontal(
            &session.hero_bbox(),
            attempted,
            session.catalog.regions(),
        );
    }

    let bbox = session.hero_bbox();
    let probe = session.resolver.probe_floor(&bbox, session.catalog.regions());
    if probe.grounded != session.grounded {
        session.grounded = probe.grounded;
        log::debug!(
            "tick {}: grounded={} floor={:?}",
            session.tick,
            probe.grounded,
            probe.floor_top
        );
        events.push(GameEvent::GroundedChanged { grounded: probe.grounded });
    }

    if classify_contacts(session, &mut events) {
        // Hazard contact is terminal: the world freezes where it is.
        return events;
    }

    // ── 4. Vertical ──
    let dy = session.hero.tick_vertical();

    // ── 5. One scroll application ──
    if dx != 0.0 || dy != 0.0 {
        session.catalog.scroll(-dx, -dy);
    }
    session.hero.x += dx;

    events
}

/// Classify overlaps with special regions. Returns true when a hazard
/// was touched (the session is moved to Dead).
fn classify_contacts(session: &mut GameSession, events: &mut Vec<GameEvent>) -> bool {
    let bbox = session.hero_bbox();

    if session.resolver.hazard_contact(&bbox, session.catalog.regions()) {
        events.push(GameEvent::HazardTouched);
        session.phase = Phase::Dead;
        log::debug!("hazard contact at tick {}", session.tick);
        return true;
    }

    let mut touched: Vec<(usize, TileType)> = Vec::new();
    for (i, region) in session.catalog.intersecting(&bbox) {
        touched.push((i, region.tile));
    }

    for (i, tile) in touched {
        match tile {
            TileType::LootCrate if !session.crate_collected(i) => {
                session.collected_crates.push(i);
                session.crates_collected += 1;
                events.push(GameEvent::CrateCollected);
            }
            TileType::CheckpointGround if session.checkpoint_region != Some(i) => {
                session.checkpoint_region = Some(i);
                session.checkpoint_scroll = Some(session.catalog.scroll_offset());
                events.push(GameEvent::CheckpointReached);
                log::debug!("checkpoint reached at tick {}", session.tick);
            }
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::hero::{JumpPhase, MoveIntent};
    use crate::sim::assets::TraitTable;
    use crate::sim::level::{build_session, embedded_world};

    fn playing_session() -> GameSession {
        let (name, def) = embedded_world();
        let table = TraitTable::builtin();
        let mut session =
            build_session(&def, &name, &table, &GameConfig::default()).expect("demo world");
        session.phase = Phase::Playing;
        session
    }

    fn input(movement: MoveIntent, jump: bool) -> FrameInput {
        FrameInput { movement, jump }
    }

    #[test]
    fn non_playing_phases_do_not_tick() {
        let mut session = playing_session();
        session.phase = Phase::Title;
        let events = step(&mut session, input(MoveIntent::Right, true));
        assert!(events.is_empty());
        assert_eq!(session.tick, 0);
    }

    #[test]
    fn world_scrolls_opposite_to_motion() {
        let mut session = playing_session();

        for _ in 0..30 {
            step(&mut session, input(MoveIntent::Right, false));
        }

        let (sx, sy) = session.catalog.scroll_offset();
        assert!(sx < 0.0, "regions move left while the hero runs right");
        assert_eq!(sy, 0.0);
        // The hero's kinematic x mirrors the scroll exactly
        assert!((session.hero.x - 100.0 + sx).abs() < 1e-3);
    }

    #[test]
    fn hero_is_grounded_at_spawn_after_one_tick() {
        let mut session = playing_session();
        step(&mut session, input(MoveIntent::Stop, false));
        assert!(session.grounded);
    }

    #[test]
    fn jump_scrolls_world_down_and_returns() {
        let mut session = playing_session();
        let events = step(&mut session, input(MoveIntent::Stop, true));
        assert!(events.contains(&GameEvent::JumpStarted));
        assert_eq!(session.hero.jump, JumpPhase::Ascending);

        let mut max_sy = 0.0f32;
        for _ in 0..200 {
            step(&mut session, input(MoveIntent::Stop, false));
            let (_, sy) = session.catalog.scroll_offset();
            max_sy = max_sy.max(sy);
            if session.hero.jump == JumpPhase::Idle {
                break;
            }
        }

        assert_eq!(session.hero.jump, JumpPhase::Idle);
        // Apex 100 px: the world sank by that much and came back
        assert!((max_sy - 100.0).abs() < 1.0);
        let (_, sy) = session.catalog.scroll_offset();
        assert!(sy.abs() < 0.01);
    }

    #[test]
    fn second_jump_intent_midair_is_ignored() {
        let mut session = playing_session();
        step(&mut session, input(MoveIntent::Stop, true));
        let events = step(&mut session, input(MoveIntent::Stop, true));
        assert!(!events.contains(&GameEvent::JumpStarted));
    }

    #[test]
    fn tower_blocks_running_right_but_floor_does_not() {
        let mut session = playing_session();

        // Run right until blocked or the tower is passed
        let mut last_sx = 0.0;
        let mut stalled = 0;
        for _ in 0..600 {
            step(&mut session, input(MoveIntent::FastRight, false));
            let (sx, _) = session.catalog.scroll_offset();
            if (sx - last_sx).abs() < 1e-6 {
                stalled += 1;
                if stalled > 5 {
                    break;
                }
            } else {
                stalled = 0;
            }
            last_sx = sx;
        }

        assert!(stalled > 5, "the tower must stop horizontal motion");
        // Tower face is at column 13 (x = 520): the hero's right edge
        // (anchor 100 + 50) meets it after 370 px of travel.
        let (sx, _) = session.catalog.scroll_offset();
        assert!((sx + 370.0).abs() < 2.0);
    }

    #[test]
    fn hazard_is_terminal() {
        let mut session = playing_session();
        // Teleport the spike strip under the hero by scrolling the
        // world so the deadly region overlaps the anchor box.
        let spikes_left = 35.0 * 40.0;
        session.catalog.scroll(-(spikes_left - 110.0), 0.0);

        let events = step(&mut session, input(MoveIntent::Stop, false));
        assert!(events.contains(&GameEvent::HazardTouched));
        assert_eq!(session.phase, Phase::Dead);

        // Dead sessions no longer tick
        let tick = session.tick;
        step(&mut session, input(MoveIntent::Right, false));
        assert_eq!(session.tick, tick);
    }

    #[test]
    fn crates_are_collected_once() {
        let mut session = playing_session();
        // Scroll the crate at column 22, row 20 over the hero.
        let crate_left = 22.0 * 40.0;
        session.catalog.scroll(-(crate_left - 110.0), 0.0);

        let events = step(&mut session, input(MoveIntent::Stop, false));
        assert!(events.contains(&GameEvent::CrateCollected));
        assert_eq!(session.crates_collected, 1);

        let events = step(&mut session, input(MoveIntent::Stop, false));
        assert!(!events.contains(&GameEvent::CrateCollected));
        assert_eq!(session.crates_collected, 1);
    }

    #[test]
    fn checkpoint_fires_once_and_records_scroll() {
        let mut session = playing_session();
        let checkpoint_left = 47.0 * 40.0;
        session.catalog.scroll(-(checkpoint_left - 110.0), 0.0);

        let events = step(&mut session, input(MoveIntent::Stop, false));
        assert!(events.contains(&GameEvent::CheckpointReached));
        assert!(session.checkpoint_scroll.is_some());

        let events = step(&mut session, input(MoveIntent::Stop, false));
        assert!(!events.contains(&GameEvent::CheckpointReached));
    }
}
