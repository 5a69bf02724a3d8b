//! Player systems

use bevy::prelude::*;

use super::{HeadBob, Player, PlayerInput, PlayerLook};
use crate::animation::{Action, AnimationState};
use crate::clock::SimClock;
use crate::components::LifeState;
use crate::config::GameConfig;
use crate::locomotion::{begin_jump, step_planar, Locomotion, PlanarStep};
use crate::world::WorldQueries;

fn planar(direction: Vec3) -> Vec3 {
    Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero()
}

/// Система: input → look, jump, planar движение, выбор действия
///
/// Forward и strafe шагают раздельно: упёрлись в стену вперёд — вбок
/// всё ещё можно скользить.
#[allow(clippy::type_complexity)]
pub fn drive_players(
    mut players: Query<
        (
            &mut Transform,
            &mut Locomotion,
            &mut PlayerLook,
            &PlayerInput,
            &mut AnimationState,
            &LifeState,
        ),
        With<Player>,
    >,
    world: Res<WorldQueries>,
    config: Res<GameConfig>,
    clock: Res<SimClock>,
) {
    let dt = clock.delta_secs();
    let tuning = &config.player;

    for (mut transform, mut locomotion, mut look, input, mut animation, life) in players.iter_mut() {
        if life.is_dead() {
            continue;
        }

        look.apply(&mut transform, input.look_delta, tuning.mouse_sensitivity, tuning.max_pitch);

        let mut position = transform.translation;
        if input.jump {
            begin_jump(world.backend(), &config.locomotion, position, &mut locomotion.airborne);
        }

        let mut multiplier = if input.run { tuning.run_multiplier } else { 1.0 };
        if locomotion.is_airborne() {
            multiplier *= tuning.airborne_multiplier;
        }

        let axis = input.move_axis.clamp_length_max(1.0);
        let forward = planar(*transform.forward()) * axis.y * tuning.forward_speed * multiplier * dt;
        let side = planar(*transform.right()) * axis.x * tuning.side_speed * multiplier * dt;

        let mut moved = false;
        for displacement in [forward, side] {
            if displacement == Vec3::ZERO {
                continue;
            }
            let step = step_planar(
                world.backend(),
                &config.locomotion,
                &mut position,
                &mut locomotion.airborne,
                displacement,
            );
            moved |= step == PlanarStep::Moved;
        }

        transform.translation = position;
        locomotion.moving = moved;

        let action = match (input.is_moving(), input.fire_held) {
            (true, true) => Action::FiringMove,
            (true, false) => Action::Running,
            (false, true) => Action::Firing,
            (false, false) => Action::Idle,
        };
        animation.request(action);
    }
}

/// Система: head bob только пока игрок идёт по земле
pub fn update_head_bob(mut players: Query<(&mut HeadBob, &Locomotion), With<Player>>, clock: Res<SimClock>) {
    let dt = clock.delta_secs();

    for (mut bob, locomotion) in players.iter_mut() {
        if locomotion.moving && !locomotion.is_airborne() {
            bob.advance(dt);
        }
    }
}
