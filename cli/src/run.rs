use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, error, info};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use vip8::constants::TIMER_HZ;
use vip8::{Config, Machine};
use vip8_display::Display;

use crate::keymap::keymap;

pub fn run(rom: &Path, config: Config, ips: u32, scale: u32) -> Result<()> {
    let mut machine = Machine::new(config);

    // Load ROM
    let file = File::open(rom).with_context(|| format!("unable to open {}", rom.display()))?;
    machine
        .load_rom(&mut BufReader::new(file))
        .with_context(|| format!("unable to load {}", rom.display()))?;
    info!("running {} at {} instructions per second", rom.display(), ips);

    // Get SDL2 context
    let sdl = sdl2::init().map_err(anyhow::Error::msg)?;
    let mut display = Display::new(&sdl, scale)?;
    let mut events = sdl.event_pump().map_err(anyhow::Error::msg)?;
    display.render(machine.frame_buffer())?;

    // Set initial timing
    let cycle_time = Duration::from_secs(1) / ips;
    let timer_period = Duration::from_secs(1) / TIMER_HZ;
    let mut last_cycle = Instant::now();
    let mut last_tick = Instant::now();

    // Whether or not the instruction rate should be respected
    let mut fast_forward = false;
    // Set once the program faults; the window stays up showing the last frame
    let mut halted = false;
    let mut buzzing = false;

    'event: loop {
        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => machine.set_key(kc, true)?,
                    (Keycode::Space, _) => fast_forward = true,
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => machine.set_key(kc, false)?,
                    (Keycode::Space, _) => fast_forward = false,
                    _ => continue,
                },
                _ => continue,
            };
        }

        // Update state
        if !halted {
            if let Err(e) = machine.step() {
                error!("program halted: {}", e);
                halted = true;
            }
        }

        // Timers follow the wall clock, not the instruction rate
        while last_tick.elapsed() >= timer_period {
            machine.tick_timers();
            last_tick += timer_period;
        }
        if machine.buzzer_active() != buzzing {
            buzzing = !buzzing;
            debug!("buzzer {}", if buzzing { "on" } else { "off" });
        }

        if let Some(frame) = machine.take_frame() {
            display.render(&frame)?;
        }

        // Handle timing
        let current_time = Instant::now();
        let elapsed_cycle_time = current_time - last_cycle;
        if !fast_forward && cycle_time > elapsed_cycle_time {
            std::thread::sleep(cycle_time - elapsed_cycle_time);
        }
        last_cycle = Instant::now();
    }

    Ok(())
}
