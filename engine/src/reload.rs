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

use interface::reloading::*;

extern crate dlopen;
extern crate notify;

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::fs;
use std::io::ErrorKind::*;
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering::*};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use dlopen::raw::Library;
use notify::{recommended_watcher, Watcher, Error, RecursiveMode};
use notify::event::{Event, EventKind};

fn build_command(game_source_dir: &str) -> Command {
    let mut cargo = Command::new("cargo");
    cargo.arg("build");
    let dir = fs::canonicalize(game_source_dir)
        .unwrap_or_else(|_| PathBuf::from(game_source_dir) );
    cargo.current_dir(dir);
    cargo
}

/// Load the freshly built library and pick out its function table,
/// with a struct size check before anything in it gets called.
///
/// Inherently unsafe, but the unsafety has to end somewhere.
fn swap_in(lib_path: &str,  expected_size: usize) -> Option<&'static Functions> {
    // (on linux) dlopen refuses to open the same path twice,
    // so hard-link the library to a name it has not seen before
    static GENERATION: AtomicUsize = AtomicUsize::new(1);
    let linked = loop {
        let generation = GENERATION.fetch_add(1, Relaxed);
        let linked = format!("{}-reload.{}", lib_path, generation);
        match fs::remove_file(&linked) {
            Err(e) if e.kind() != NotFound => {
                log::warn!("cannot delete pre-existing {:?}: {}, trying .{}",
                    linked, e, generation+1,
                );
                continue;
            }
            _ => break linked,
        }
    };
    if let Err(e) = fs::hard_link(lib_path, &linked) {
        log::error!("cannot link {:?} to {:?}: {}", lib_path, linked, e);
        return None;
    }
    log::info!("reloading game functions from {:?}", linked);
    unsafe {
        let lib = match Library::open(&linked) {
            Ok(lib) => lib,
            Err(e) => {
                log::error!("cannot open {:?} as a library: {}", linked, e);
                return None;
            }
        };
        if let Err(e) = fs::remove_file(&linked) {
            log::warn!("cannot delete {:?} after loading it: {}", linked, e);
        }
        let symbol: Result<&Functions, _> = lib.symbol("GAME");
        match symbol {
            Ok(functions) if functions.size == expected_size => {
                // unloading replaced code is riskier than leaking the handle,
                // and this only happens a limited number of times per run
                Box::leak(Box::new(lib));
                Some(functions)
            }
            Ok(_) => {
                log::error!("the game struct changed size, refusing to swap functions");
                None
            }
            Err(_) => {
                log::error!("{:?} has no GAME symbol, is expose_game_reloadably!{{}} missing?",
                    linked,
                );
                None
            }
        }
    }
}

/// Watch the game source directory and call back on changes,
/// at most once per second.
fn watch(src: &str,  on_change: &mut dyn FnMut()) {
    const DEBOUNCE_INTERVAL: Duration = Duration::from_secs(1);
    let mut last_forwarded = Instant::now();
    // rebuild on this thread so the time between events
    // is not affected by how long a rebuild takes
    let (tx, rx) = mpsc::channel();
    let debouncer = move |event: Result<Event,Error>| {
        match event {
            Ok(Event { kind: EventKind::Access(_), .. }) => {}
            Ok(event) => {
                log::debug!("fs event: {:?}", event);
                let now = Instant::now();
                if now.saturating_duration_since(last_forwarded) >= DEBOUNCE_INTERVAL {
                    last_forwarded = now;
                    let _ = tx.send(());
                }
            }
            Err(e) => {
                log::warn!("fs watch error: {} ({:?})", e, e.paths);
            }
        }
    };
    let mut watcher = match recommended_watcher(debouncer) {
        Ok(watcher) => watcher,
        Err(e) => {
            log::error!("cannot create fs watcher: {} - hot reloading will not work", e);
            return;
        }
    };
    if let Err(e) = watcher.watch(Path::new(src), RecursiveMode::NonRecursive) {
        log::error!("cannot watch {:?}: {} - hot reloading will not work", src, e);
        return;
    }

    loop {
        match rx.recv() {
            Ok(()) => on_change(),
            Err(e) => {
                log::error!("fs watcher channel receive error: {}, quitting", e);
                return;
            }
        }
    }
}

pub fn start_reloading(reloadable: &ReloadableGame) {
    let game_dir = reloadable.game_dir;
    let lib = DLL_PREFIX.to_string() + reloadable.target_name + DLL_SUFFIX;
    let lib = [game_dir, "target", "debug", &lib].join(MAIN_SEPARATOR_STR);
    let functions = reloadable.functions.clone();
    thread::spawn(move|| {
        // don't delay game start on compiling
        let mut command = build_command(game_dir);
        log::info!("rebuild command: {:?}", command);
        // for module mode to work, the source code cannot be inside a subdir.
        log::info!("watching {:?} for source code changes", game_dir);
        watch(game_dir, &mut|| {
            let started = Instant::now();
            match command.status() {
                Ok(exit) if exit.success() => {}
                Ok(_) => return, // cargo already printed the error
                Err(e) => {
                    log::error!("failed to start cargo build: {}", e);
                    return;
                }
            }
            let before = unsafe{ &*functions.load(SeqCst) };
            if let Some(fresh) = swap_in(&lib, before.size) {
                functions.store(fresh as *const _ as *mut _, SeqCst);
                log::debug!("update swapped {:p} -> {:p}", before.update, fresh.update);
                log::info!("loaded new code in {:?}", started.elapsed());
            }
        });
    });
}
