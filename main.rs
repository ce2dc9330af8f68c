/* This file is part of city_drift.
 * You can redistribute it and/or modify it under the terms of the
 * GNU General Public License as published by the Free Software Foundation,
 * either version 3 of the License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

#![cfg_attr(windows, windows_subsystem = "windows")]

extern crate engine;

#[cfg(feature="dyn")]
extern crate game;
#[cfg(not(feature="dyn"))]
mod game;

fn main() {
    #[cfg(not(target_arch="wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    #[cfg(target_arch="wasm32")]
    {
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));
        wasm_logger::init(wasm_logger::Config::default());
    }

    let game = game::create_game();
    #[cfg(feature="dyn")]
    engine::reload::start_reloading(&game);
    engine::start(game, game::NAME, game::INITIAL_SIZE);
}
