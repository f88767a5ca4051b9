use rand::{Rng, RngCore};

use crate::config::{Config, SpriteEdge};
use crate::constants::{
    ADDRESS_MASK, DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_ADDRESS, FONT_GLYPH_SIZE, STACK_SIZE,
};
use crate::error::{Error, Result};
use crate::opcode::Opcode;
use crate::state::State;

/// What an operation may need beyond the machine state
pub struct Context<'a> {
    pub config: &'a Config,
    pub rng: &'a mut dyn RngCore,
}

/// Every operation computes the next State from the current one.
/// The current state is never touched, so a failed operation leaves nothing half-done.
pub type Operation = for<'a> fn(&dyn Opcode, &State, &mut Context<'a>) -> Result<State>;

/// The address of the instruction after the current one
fn next(state: &State) -> u16 {
    state.pc + 0x2
}

fn skip_if(state: &State, condition: bool) -> State {
    let pc = if condition {
        state.pc + 0x4
    } else {
        state.pc + 0x2
    };
    State { pc, ..*state }
}

/// Writes `value` to Vx, advancing the pc
fn set_vx(op: &dyn Opcode, state: &State, value: u8) -> State {
    let mut v = state.v;
    v[op.x()] = value;
    State {
        pc: next(state),
        v,
        ..*state
    }
}

/// Writes `value` to Vx then `flag` to VF; when x is F the flag wins
fn set_vx_and_flag(op: &dyn Opcode, state: &State, value: u8, flag: bool) -> State {
    let mut v = state.v;
    v[op.x()] = value;
    v[0xF] = u8::from(flag);
    State {
        pc: next(state),
        v,
        ..*state
    }
}

/// clear
pub fn clr(_op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(State {
        pc: next(state),
        frame_buffer: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        draw_flag: true,
        ..*state
    })
}

/// PC = STACK.pop()
pub fn rts(_op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    if state.sp == 0 {
        return Err(Error::StackUnderflow { pc: state.pc });
    }
    let sp = state.sp - 1;
    Ok(State {
        pc: state.stack[sp],
        sp,
        ..*state
    })
}

/// PC = addr
pub fn jump(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(State {
        pc: op.addr(),
        ..*state
    })
}

/// STACK.push(PC + 2); PC = addr
pub fn call(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    if state.sp >= STACK_SIZE {
        return Err(Error::StackOverflow { pc: state.pc });
    }
    let mut stack = state.stack;
    stack[state.sp] = next(state);
    Ok(State {
        pc: op.addr(),
        sp: state.sp + 1,
        stack,
        ..*state
    })
}

/// if Vx == kk then pc += 2
pub fn ske(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(skip_if(state, state.v[op.x()] == op.kk()))
}

/// if Vx != kk then pc += 2
pub fn skne(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(skip_if(state, state.v[op.x()] != op.kk()))
}

/// if Vx == Vy then pc += 2
pub fn skre(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(skip_if(state, state.v[op.x()] == state.v[op.y()]))
}

/// if Vx != Vy then pc += 2
pub fn skrne(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(skip_if(state, state.v[op.x()] != state.v[op.y()]))
}

/// Vx = kk
pub fn load(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(set_vx(op, state, op.kk()))
}

/// Vx += kk
/// Overflow wraps and VF is left alone
pub fn add(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(set_vx(op, state, state.v[op.x()].wrapping_add(op.kk())))
}

/// Vx = Vy
pub fn mv(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(set_vx(op, state, state.v[op.y()]))
}

/// Vx |= Vy
pub fn or(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(set_vx(op, state, state.v[op.x()] | state.v[op.y()]))
}

/// Vx &= Vy
pub fn and(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(set_vx(op, state, state.v[op.x()] & state.v[op.y()]))
}

/// Vx ^= Vy
pub fn xor(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(set_vx(op, state, state.v[op.x()] ^ state.v[op.y()]))
}

/// Vx += Vy; VF = carry
pub fn addc(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    let (res, carry) = state.v[op.x()].overflowing_add(state.v[op.y()]);
    Ok(set_vx_and_flag(op, state, res, carry))
}

/// Vx -= Vy; VF = !borrow
pub fn sub(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    let (res, borrow) = state.v[op.x()].overflowing_sub(state.v[op.y()]);
    Ok(set_vx_and_flag(op, state, res, !borrow))
}

/// Vx = Vy - Vx; VF = !borrow
pub fn subn(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    let (res, borrow) = state.v[op.y()].overflowing_sub(state.v[op.x()]);
    Ok(set_vx_and_flag(op, state, res, !borrow))
}

/// The register a shift reads from
fn shift_source(op: &dyn Opcode, state: &State, config: &Config) -> u8 {
    if config.shift_uses_vy {
        state.v[op.y()]
    } else {
        state.v[op.x()]
    }
}

/// Vx >>= 1; VF = the bit shifted out
pub fn shr(op: &dyn Opcode, state: &State, ctx: &mut Context) -> Result<State> {
    let source = shift_source(op, state, ctx.config);
    Ok(set_vx_and_flag(op, state, source >> 1, source & 0x1 == 0x1))
}

/// Vx <<= 1; VF = the bit shifted out
pub fn shl(op: &dyn Opcode, state: &State, ctx: &mut Context) -> Result<State> {
    let source = shift_source(op, state, ctx.config);
    Ok(set_vx_and_flag(op, state, source << 1, source & 0x80 == 0x80))
}

/// I = addr
pub fn loadi(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(State {
        pc: next(state),
        i: op.addr(),
        ..*state
    })
}

/// PC = V0 + addr
pub fn jumpi(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(State {
        pc: u16::from(state.v[0x0]) + op.addr(),
        ..*state
    })
}

/// Vx = rand_byte & kk
pub fn rand(op: &dyn Opcode, state: &State, ctx: &mut Context) -> Result<State> {
    let rand_byte: u8 = ctx.rng.gen();
    Ok(set_vx(op, state, rand_byte & op.kk()))
}

/// Where a sprite pixel offset `(dx, dy)` from `(x, y)` lands, if anywhere
fn place(edge: SpriteEdge, x: usize, y: usize, dx: usize, dy: usize) -> Option<(usize, usize)> {
    match edge {
        SpriteEdge::Wrap => Some(((x + dx) % DISPLAY_WIDTH, (y + dy) % DISPLAY_HEIGHT)),
        SpriteEdge::Clip => {
            let x = x % DISPLAY_WIDTH + dx;
            let y = y % DISPLAY_HEIGHT + dy;
            (x < DISPLAY_WIDTH && y < DISPLAY_HEIGHT).then_some((x, y))
        }
    }
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs the n-byte sprite at memory I..I+n onto the FrameBuffer at (Vx, Vy).
/// VF is set if any lit pixel was turned off.
pub fn draw(op: &dyn Opcode, state: &State, ctx: &mut Context) -> Result<State> {
    let sprite = state.read(usize::from(state.i), usize::from(op.n()))?;
    let x = usize::from(state.v[op.x()]);
    let y = usize::from(state.v[op.y()]);

    let mut frame_buffer = state.frame_buffer;
    let mut collision = false;
    for (dy, &byte) in sprite.iter().enumerate() {
        for dx in 0..8 {
            if (byte >> (7 - dx)) & 0x1 == 0 {
                continue;
            }
            if let Some((px, py)) = place(ctx.config.sprite_edge, x, y, dx, dy) {
                let pixel = &mut frame_buffer[py][px];
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }
    }

    let mut v = state.v;
    v[0xF] = u8::from(collision);
    Ok(State {
        pc: next(state),
        draw_flag: true,
        v,
        frame_buffer,
        ..*state
    })
}

/// Whether the key named by Vx is held; values past F name no key
fn key_held(op: &dyn Opcode, state: &State) -> bool {
    state
        .pressed_keys
        .get(usize::from(state.v[op.x()]))
        .copied()
        .unwrap_or(false)
}

/// if Vx.pressed then pc += 2
pub fn skpr(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(skip_if(state, key_held(op, state)))
}

/// if !Vx.pressed then pc += 2
pub fn skup(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(skip_if(state, !key_held(op, state)))
}

/// Vx = DT
pub fn getdt(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(set_vx(op, state, state.delay_timer))
}

/// Vx = await keypress
/// The pc only moves on once a key is held, so this runs again on every step until then
pub fn keyd(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    match state.pressed_keys.iter().position(|&pressed| pressed) {
        Some(key) => Ok(State {
            register_needing_key: None,
            ..set_vx(op, state, key as u8)
        }),
        None => Ok(State {
            register_needing_key: Some(op.x()),
            ..*state
        }),
    }
}

/// DT = Vx
pub fn setdt(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(State {
        pc: next(state),
        delay_timer: state.v[op.x()],
        ..*state
    })
}

/// ST = Vx
pub fn setst(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(State {
        pc: next(state),
        sound_timer: state.v[op.x()],
        ..*state
    })
}

/// I += Vx
pub fn addi(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(State {
        pc: next(state),
        i: (state.i + u16::from(state.v[op.x()])) & ADDRESS_MASK,
        ..*state
    })
}

/// I = address of the sprite sheet glyph for the low nibble of Vx
pub fn ldspr(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    let glyph = u16::from(state.v[op.x()] & 0xF);
    Ok(State {
        pc: next(state),
        i: FONT_ADDRESS + glyph * FONT_GLYPH_SIZE,
        ..*state
    })
}

/// mem[I..I+3] = bcd(Vx)
pub fn bcd(op: &dyn Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    let value = state.v[op.x()];
    let mut next_state = State {
        pc: next(state),
        ..*state
    };
    next_state
        .read_mut(usize::from(state.i), 3)?
        .copy_from_slice(&[value / 100, value / 10 % 10, value % 10]);
    Ok(next_state)
}

/// Where I ends up after transferring V0..=Vx
fn index_after_transfer(op: &dyn Opcode, state: &State, config: &Config) -> u16 {
    if config.load_store_increments_i {
        (state.i + op.x() as u16 + 1) & ADDRESS_MASK
    } else {
        state.i
    }
}

/// mem[I..=I+x] = V0..=Vx
pub fn stor(op: &dyn Opcode, state: &State, ctx: &mut Context) -> Result<State> {
    let count = op.x() + 1;
    let mut next_state = State {
        pc: next(state),
        i: index_after_transfer(op, state, ctx.config),
        ..*state
    };
    next_state
        .read_mut(usize::from(state.i), count)?
        .copy_from_slice(&state.v[..count]);
    Ok(next_state)
}

/// V0..=Vx = mem[I..=I+x]
pub fn read(op: &dyn Opcode, state: &State, ctx: &mut Context) -> Result<State> {
    let count = op.x() + 1;
    let mut v = state.v;
    v[..count].copy_from_slice(state.read(usize::from(state.i), count)?);
    Ok(State {
        pc: next(state),
        i: index_after_transfer(op, state, ctx.config),
        v,
        ..*state
    })
}
