use super::city::{Camera, Skyline, VIEW_SPAN};
use super::messages::{MessageBoard, MessageQueue};
use super::player::Player;
use ::interface::game::*;
use ::vecmath::{vec2_add, vec2_normalized, vec2_scale, vec2_square_len, vec2_sub};

pub const NAME: &str = "city drift";
pub const INITIAL_SIZE: [f32;2] = [600.0, 600.0];

const TICK_RATE: u32 = 60;
const TICK_DT: f32 = 1.0 / TICK_RATE as f32;
const MAX_FRAME_DT: f32 = 0.25; // cap to avoid a tick avalanche after a stall
const MOVE_STEP: f32 = 10.0; // requested speed while move keys are held
const NUDGE_STEP: f32 = 10.0; // arrow key position jump
const DEFAULT_SEED: u64 = 42;
const GROUND_AREA: [f32;4] = [-6000.0, 320.0, 13000.0, 8000.0]; // world units
const FONT_SIZE: f32 = 20.0 / VIEW_SPAN;
const LINE_WIDTH: f32 = 1.0 / VIEW_SPAN;
const MESSAGE_PAD: f32 = 4.0 / VIEW_SPAN;
const MESSAGE_ROW: f32 = 32.0 / VIEW_SPAN; // font + padding + gap
const MARGIN: f32 = 10.0 / VIEW_SPAN;

const BACKGROUND_COLOR: &str = "ffffff";
const GROUND_COLOR: &str = "505050";
const PLAYER_COLOR: &str = "000000";
const VELOCITY_LINE_COLOR: &str = "e62937";
const CLICK_LINE_COLOR: &str = "c87aff";
const NORMAL_LINE_COLOR: &str = "ffa100";
const HUD_COLOR: &str = "000000";
const CLOCK_COLOR: &str = "00e430";
const MESSAGE_COLOR: &str = "ffffff";
const MESSAGE_BG_COLOR: &str = "19191927";

#[derive(Clone,Copy, Default)]
struct Keys {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

pub struct CityDrift {
    player: Player,
    camera: Camera,
    skyline: Skyline,
    messages: MessageQueue,
    board: MessageBoard,
    keys: Keys,
    cursor: [f32;2],
    click_direction: [f32;2], // latest clicked direction, for the indicator lines
    clock: f64,
    accumulator: f32,
    seed: u64,
}

impl CityDrift {
    pub fn new() -> Self {
        CityDrift::with_seed(DEFAULT_SEED)
    }
    pub fn with_seed(seed: u64) -> Self {
        let player = Player::new();
        let mut camera = Camera::new();
        camera.follow(player.position);
        CityDrift {
            player,
            camera,
            skyline: Skyline::generate(seed),
            messages: MessageQueue::new(),
            board: MessageBoard::new(),
            keys: Keys::default(),
            cursor: [0.5, 0.5],
            click_direction: [0.0, 0.0],
            clock: 0.0,
            accumulator: 0.0,
            seed,
        }
    }

    /// Back to the starting state with the same city. The clock keeps running.
    fn reset(&mut self) {
        self.player = Player::new();
        self.camera = Camera::new();
        self.camera.follow(self.player.position);
        self.skyline = Skyline::generate(self.seed);
        self.messages.clear();
        self.board.clear();
        self.click_direction = [0.0, 0.0];
    }

    fn any_move_key_held(&self) -> bool {
        self.keys.up || self.keys.down || self.keys.left || self.keys.right
    }

    /// Summed direction of the held move keys,
    /// `None` when none are held or they cancel out.
    fn held_direction(&self) -> Option<[f32;2]> {
        let x = self.keys.right as i8 - self.keys.left as i8;
        let y = self.keys.down as i8 - self.keys.up as i8;
        if x == 0  &&  y == 0 {
            return None;
        }
        Some(vec2_scale(vec2_normalized([x as f32, y as f32]), MOVE_STEP))
    }

    /// Reissue the move request after the held set changed.
    fn apply_move_keys(&mut self) {
        if let Some(direction) = self.held_direction() {
            if let Err(e) = self.player.request_move(direction) {
                log::debug!("move request dropped: {}", e);
            }
        }
    }

    fn tick(&mut self) {
        self.camera.follow(self.player.position);
        if !self.any_move_key_held() {
            self.player.request_stop();
        }
        self.player.tick();
        self.clock += TICK_DT as f64;
        self.board.tick(self.clock, &mut self.messages);
    }
}

impl Game for CityDrift {
    fn render(&mut self,  gfx: &mut Graphics) {
        let camera = self.camera;

        fn to_view_area(camera: &Camera,  area: [f32;4]) -> [f32;4] {
            let [x, y] = camera.world_to_view([area[0], area[1]]);
            [x, y, area[2]/VIEW_SPAN, area[3]/VIEW_SPAN]
        }
        fn draw_ray(gfx: &mut Graphics,  camera: &Camera,  color: Color,  from: [f32;2],  ray: [f32;2]) {
            if vec2_square_len(ray) == 0.0 {
                return;
            }
            let start = camera.world_to_view(from);
            let end = camera.world_to_view(vec2_add(from, ray));
            gfx.line(color, LINE_WIDTH, [start[0], start[1], end[0], end[1]]);
        }
        fn draw_message_row(gfx: &mut Graphics,  text: &str,  position: [f32;2],  center: Align) {
            let width = text.len() as f32 * FONT_SIZE * 0.55; // estimate, the backend cannot measure text
            let left = match center {
                Align::Center => position[0] - width/2.0,
                _ => position[0],
            };
            gfx.rectangle(hex(MESSAGE_BG_COLOR), [
                left - MESSAGE_PAD,
                position[1] - MESSAGE_PAD,
                width + 2.0*MESSAGE_PAD,
                FONT_SIZE + 2.0*MESSAGE_PAD,
            ]);
            gfx.text(hex(MESSAGE_COLOR), position, [center, Align::Left], FONT_SIZE, text.to_string());
        }

        gfx.rectangle(hex(BACKGROUND_COLOR), [0.0, 0.0, 1.0, 1.0]);
        gfx.rectangle(hex(GROUND_COLOR), to_view_area(&camera, GROUND_AREA));
        for building in &self.skyline.buildings {
            gfx.rectangle(building.color, to_view_area(&camera, building.area));
        }

        let player_view = camera.world_to_view(self.player.position);
        gfx.circle(hex(PLAYER_COLOR), player_view, self.player.radius()/VIEW_SPAN);

        // indicator lines out of the player center
        let velocity = self.player.velocity();
        if vec2_square_len(velocity) > 0.0 {
            let heading = vec2_scale(vec2_normalized(velocity), self.player.max_speed()*2.0);
            draw_ray(gfx, &camera, hex(VELOCITY_LINE_COLOR), self.player.position, heading);
        }
        draw_ray(gfx, &camera, hex(CLICK_LINE_COLOR), self.player.position, self.click_direction);
        let normal = [-self.click_direction[1], self.click_direction[0]];
        draw_ray(gfx, &camera, hex(NORMAL_LINE_COLOR), self.player.position, normal);

        // state readout next to the player
        let target = self.player.target_velocity();
        let hud = camera.world_to_view(camera.target);
        gfx.text(hex(HUD_COLOR), hud, [Align::Left, Align::Left], FONT_SIZE, format!(
            "vel = {{{:.2}, {:.2}}} target = {{{:.2}, {:.2}}}",
            velocity[0], velocity[1], target[0], target[1],
        ));
        gfx.text(hex(HUD_COLOR), [hud[0], hud[1] + FONT_SIZE], [Align::Left, Align::Left], FONT_SIZE,
            format!("{:?}", self.player.transition()),
        );

        gfx.text(hex(CLOCK_COLOR), [MARGIN, MARGIN], [Align::Left, Align::Left], FONT_SIZE,
            format!("{:.2}", self.clock),
        );

        if let Some(message) = self.board.current() {
            draw_message_row(gfx, message, [0.5, 3.0*MARGIN], Align::Center);
        }
        // still queued messages, oldest at the bottom
        for (i, message) in self.messages.iter().enumerate() {
            let y = 1.0 - MESSAGE_ROW*(i as f32 + 1.0) - MARGIN;
            draw_message_row(gfx, message, [MARGIN, y], Align::Left);
        }
    }

    fn update(&mut self,  dt: f32) {
        self.accumulator += dt.min(MAX_FRAME_DT);
        while self.accumulator >= TICK_DT {
            self.accumulator -= TICK_DT;
            self.tick();
        }
    }

    fn key_press(&mut self,  key: Key) {
        match key {
            // key repeats must not restart the transition window
            Key::W => if !self.keys.up { self.keys.up = true; self.apply_move_keys(); },
            Key::A => if !self.keys.left { self.keys.left = true; self.apply_move_keys(); },
            Key::S => if !self.keys.down { self.keys.down = true; self.apply_move_keys(); },
            Key::D => if !self.keys.right { self.keys.right = true; self.apply_move_keys(); },
            Key::ArrowUp => self.player.nudge([0.0, -NUDGE_STEP]),
            Key::ArrowDown => self.player.nudge([0.0, NUDGE_STEP]),
            Key::ArrowLeft => self.player.nudge([-NUDGE_STEP, 0.0]),
            Key::ArrowRight => self.player.nudge([NUDGE_STEP, 0.0]),
            Key::R => self.reset(),
            Key::C => self.messages.clear(),
            Key::Backspace => { self.messages.pop(); } // discard a single message
        }
    }

    fn key_release(&mut self,  key: Key) {
        match key {
            Key::W => { self.keys.up = false; self.apply_move_keys(); }
            Key::A => { self.keys.left = false; self.apply_move_keys(); }
            Key::S => { self.keys.down = false; self.apply_move_keys(); }
            Key::D => { self.keys.right = false; self.apply_move_keys(); }
            _ => {}
        }
    }

    fn mouse_move(&mut self,  pos: [f32; 2]) {
        self.cursor = pos;
    }

    fn mouse_press(&mut self,  button: MouseButton) {
        if button != MouseButton::Left {
            return;
        }
        let world = self.camera.view_to_world(self.cursor);
        self.messages.push(format!("mouse clicked v = {{{:.2}, {:.2}}}", world[0], world[1]));
        let direction = vec2_sub(world, self.player.position);
        self.click_direction = direction;
        if let Err(e) = self.player.request_move(direction) {
            log::debug!("move request dropped: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::player::{Transition, TRANSITION_TICKS};
    use ::vecmath::vec2_len;

    #[test]
    fn test_same_seed_same_game() {
        let first = CityDrift::with_seed(9);
        let second = CityDrift::with_seed(9);
        assert_eq!(first.skyline.buildings, second.skyline.buildings);
        assert_eq!(first.player.position, [0.0, 0.0]);
    }

    #[test]
    fn test_move_key_requests_axis_move() {
        let mut game = CityDrift::with_seed(1);
        game.key_press(Key::D);
        assert_eq!(game.player.target_velocity(), [MOVE_STEP, 0.0]);
        assert_eq!(game.player.transition(), Transition::Accelerating { ticks_left: TRANSITION_TICKS });
        game.key_press(Key::S);
        let target = game.player.target_velocity();
        assert!((vec2_len(target) - MOVE_STEP).abs() < 1e-4);
        assert!(target[0] > 0.0  &&  target[1] > 0.0);
        assert!((target[0] - target[1]).abs() < 1e-4);
    }

    #[test]
    fn test_opposed_keys_issue_nothing() {
        let mut game = CityDrift::with_seed(1);
        game.key_press(Key::D);
        game.update(TICK_DT);
        game.update(TICK_DT);
        game.key_press(Key::A);
        // the canceled direction neither re-targets nor restarts the window
        assert_eq!(game.player.target_velocity(), [MOVE_STEP, 0.0]);
        assert_eq!(game.player.transition(), Transition::Accelerating { ticks_left: TRANSITION_TICKS-2 });
    }

    #[test]
    fn test_key_repeat_does_not_restart_window() {
        let mut game = CityDrift::with_seed(1);
        game.key_press(Key::D);
        game.update(TICK_DT);
        game.key_press(Key::D); // autorepeat
        assert_eq!(game.player.transition(), Transition::Accelerating { ticks_left: TRANSITION_TICKS-1 });
    }

    #[test]
    fn test_release_all_keys_decays_velocity() {
        let mut game = CityDrift::with_seed(1);
        game.key_press(Key::D);
        for _ in 0..TRANSITION_TICKS {
            game.update(TICK_DT);
        }
        assert_eq!(game.player.velocity(), [MOVE_STEP, 0.0]);
        game.key_release(Key::D);
        game.update(TICK_DT);
        assert_eq!(game.player.transition(), Transition::Decelerating);
        assert_eq!(game.player.velocity(), [9.0, 0.0]);
    }

    #[test]
    fn test_release_mid_window_defers_stop() {
        let mut game = CityDrift::with_seed(1);
        game.key_press(Key::D);
        for _ in 0..5 {
            game.update(TICK_DT);
        }
        game.key_release(Key::D);
        for _ in 5..TRANSITION_TICKS {
            game.update(TICK_DT);
        }
        assert_eq!(game.player.velocity(), [MOVE_STEP, 0.0]);
        assert_eq!(game.player.transition(), Transition::Decelerating);
    }

    #[test]
    fn test_click_pushes_message_and_aims_player() {
        let mut game = CityDrift::with_seed(1);
        game.mouse_move([0.75, 0.5]);
        game.mouse_press(MouseButton::Left);
        // camera starts at [20, 20], so view x 0.75 is world x 0.25*600 + 20
        let live: Vec<&str> = game.messages.iter().collect();
        assert_eq!(live, ["mouse clicked v = {170.00, 20.00}"]);
        assert_eq!(game.player.transition(), Transition::Accelerating { ticks_left: TRANSITION_TICKS });
        let target = game.player.target_velocity();
        assert!((vec2_len(target) - game.player.max_speed()).abs() < 1e-3);
        assert!((target[0]/target[1] - 170.0/20.0).abs() < 0.01);
    }

    #[test]
    fn test_right_click_is_ignored() {
        let mut game = CityDrift::with_seed(1);
        game.mouse_press(MouseButton::Right);
        assert!(game.messages.is_empty());
        assert_eq!(game.player.transition(), Transition::Idle);
    }

    #[test]
    fn test_arrows_nudge_without_velocity() {
        let mut game = CityDrift::with_seed(1);
        game.key_press(Key::ArrowLeft);
        game.key_press(Key::ArrowDown);
        assert_eq!(game.player.position, [-NUDGE_STEP, NUDGE_STEP]);
        assert_eq!(game.player.velocity(), [0.0, 0.0]);
    }

    #[test]
    fn test_reset_command_restores_start() {
        let mut game = CityDrift::with_seed(5);
        game.mouse_move([0.8, 0.3]);
        game.mouse_press(MouseButton::Left);
        game.key_press(Key::D);
        for _ in 0..60 {
            game.update(TICK_DT); // a second of game time
        }
        assert_ne!(game.player.position, [0.0, 0.0]);
        assert!(!game.messages.is_empty());
        game.key_press(Key::R);
        assert_eq!(game.player.position, [0.0, 0.0]);
        assert_eq!(game.player.velocity(), [0.0, 0.0]);
        assert!(game.messages.is_empty());
        assert_eq!(game.board.current(), None);
        assert_eq!(game.skyline.buildings, Skyline::generate(5).buildings);
        assert!(game.clock > 0.9); // the clock is not part of the reset
    }

    #[test]
    fn test_clear_command_empties_queue() {
        let mut game = CityDrift::with_seed(1);
        game.mouse_press(MouseButton::Left);
        game.mouse_move([0.3, 0.3]);
        game.mouse_press(MouseButton::Left);
        assert_eq!(game.messages.len(), 2);
        game.key_press(Key::C);
        assert!(game.messages.is_empty());
    }

    #[test]
    fn test_backspace_discards_oldest_message() {
        let mut game = CityDrift::with_seed(1);
        game.mouse_press(MouseButton::Left);
        game.mouse_move([0.3, 0.3]);
        game.mouse_press(MouseButton::Left);
        let second = game.messages.iter().nth(1).map(str::to_string);
        game.key_press(Key::Backspace);
        assert_eq!(game.messages.len(), 1);
        assert_eq!(game.messages.iter().next().map(str::to_string), second);
    }

    #[test]
    fn test_update_carries_partial_ticks() {
        let mut game = CityDrift::with_seed(1);
        game.key_press(Key::D);
        game.update(TICK_DT*0.5); // not enough for a tick
        assert_eq!(game.player.transition(), Transition::Accelerating { ticks_left: TRANSITION_TICKS });
        game.update(TICK_DT); // accumulated 1.5 ticks
        assert_eq!(game.player.transition(), Transition::Accelerating { ticks_left: TRANSITION_TICKS-1 });
        game.update(TICK_DT*0.75); // accumulated 1.25 ticks
        assert_eq!(game.player.transition(), Transition::Accelerating { ticks_left: TRANSITION_TICKS-2 });
    }

    #[test]
    fn test_render_draws_the_scene() {
        let mut game = CityDrift::with_seed(1);
        let mut gfx = Graphics::default();
        game.render(&mut gfx);
        let shapes: Vec<Shape> = gfx.drain().collect();
        assert!(matches!(shapes[0], Shape::Rectangle { .. })); // background first
        let rectangles = shapes.iter().filter(|s| matches!(s, Shape::Rectangle{..})).count();
        let circles = shapes.iter().filter(|s| matches!(s, Shape::Circle{..})).count();
        let lines = shapes.iter().filter(|s| matches!(s, Shape::Line{..})).count();
        assert_eq!(rectangles, 2 + super::super::city::BUILDING_COUNT);
        assert_eq!(circles, 1);
        assert_eq!(lines, 0); // at rest with nothing clicked yet
    }
}
