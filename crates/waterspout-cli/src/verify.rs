//! `waterspout verify`: runs the selected tier against the scalar engine.
//!
//! Every operation on every element type is executed at each 4-byte offset
//! inside a 32-byte line (whole elements only), on both engines, and the
//! results are compared bit for bit. NaN results match any NaN.

use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use waterspout_core::{AlignedBuffer, Element, Engine, Tier, TierSelector};

/// Buffer length used when `--size` is not given; odd so tails are exercised.
pub const DEFAULT_SIZE: usize = 4099;

const LINE: usize = 32;
const GAIN: f32 = 0.37;

#[derive(Debug, Clone, Copy)]
enum Op {
    Clear,
    Set,
    Scale,
    Copy,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Op {
    const ALL: [Op; 8] = [
        Op::Clear,
        Op::Set,
        Op::Scale,
        Op::Copy,
        Op::Add,
        Op::Subtract,
        Op::Multiply,
        Op::Divide,
    ];

    fn name(self) -> &'static str {
        match self {
            Op::Clear => "clear",
            Op::Set => "set",
            Op::Scale => "scale",
            Op::Copy => "copy",
            Op::Add => "add",
            Op::Subtract => "subtract",
            Op::Multiply => "multiply",
            Op::Divide => "divide",
        }
    }

    fn apply<T: Element>(self, engine: &Engine, a: &[T], b: &[T], dst: &mut [T]) {
        match self {
            Op::Clear => engine.clear(dst),
            Op::Set => engine.set(dst, a.first().copied().unwrap_or(T::ONE)),
            Op::Scale => {
                dst.copy_from_slice(a);
                engine.scale(dst, GAIN);
            }
            Op::Copy => engine.copy(a, dst),
            Op::Add => engine.add(a, b, dst),
            Op::Subtract => engine.subtract(a, b, dst),
            Op::Multiply => engine.multiply(a, b, dst),
            Op::Divide => engine.divide(a, b, dst),
        }
    }
}

/// Result of one (element type, operation) pair across all offsets.
#[derive(Debug, Clone)]
pub struct Check {
    pub element: &'static str,
    pub operation: &'static str,
    pub offsets: usize,
    /// Offsets whose output differed from the scalar engine.
    pub mismatches: usize,
}

impl Check {
    pub fn passed(&self) -> bool {
        self.mismatches == 0
    }
}

fn same<T: Element>(a: &[T], b: &[T]) -> bool {
    a.iter().zip(b).all(|(&x, &y)| {
        x.bits() == y.bits() || (T::IS_FLOAT && x.to_f64().is_nan() && y.to_f64().is_nan())
    })
}

#[allow(clippy::cast_precision_loss)]
fn operands<T: Element>(len: usize) -> (AlignedBuffer<T>, AlignedBuffer<T>) {
    let mut a = AlignedBuffer::<T>::new(len);
    let mut b = AlignedBuffer::<T>::new(len);
    for (i, (x, y)) in a.iter_mut().zip(b.iter_mut()).enumerate() {
        let t = i as f64;
        *x = T::from_f64((t * 0.754_877).sin() * 1.0e4);
        *y = T::from_f64((t * 0.569_840).cos() * 1.0e2);
    }
    (a, b)
}

fn check_type<T: Element>(engine: &Engine, reference: &Engine, size: usize, checks: &mut Vec<Check>) {
    let elem = std::mem::size_of::<T>();
    let step = elem.max(4);
    let room = size + LINE / elem;
    let (a, b) = operands::<T>(room);

    for op in Op::ALL {
        let mut check = Check {
            element: T::NAME,
            operation: op.name(),
            offsets: 0,
            mismatches: 0,
        };
        for byte_offset in (0..LINE).step_by(step) {
            let offset = byte_offset / elem;
            let span = offset..offset + size;
            let mut got = AlignedBuffer::<T>::new(room);
            let mut want = AlignedBuffer::<T>::new(room);
            op.apply(engine, &a[span.clone()], &b[span.clone()], &mut got[span.clone()]);
            op.apply(reference, &a[span.clone()], &b[span.clone()], &mut want[span]);
            check.offsets += 1;
            if !same(&got, &want) {
                tracing::warn!(element = T::NAME, operation = op.name(), offset = byte_offset, "Mismatch");
                check.mismatches += 1;
            }
        }
        checks.push(check);
    }
}

/// Runs every operation for every element type on `engine`.
pub fn run(engine: &Engine, size: usize) -> waterspout_core::Result<Vec<Check>> {
    let reference = Engine::new(TierSelector::Force(Tier::Fpu), false)?;
    let mut checks = Vec::with_capacity(80);
    check_type::<i8>(engine, &reference, size, &mut checks);
    check_type::<u8>(engine, &reference, size, &mut checks);
    check_type::<i16>(engine, &reference, size, &mut checks);
    check_type::<u16>(engine, &reference, size, &mut checks);
    check_type::<i32>(engine, &reference, size, &mut checks);
    check_type::<u32>(engine, &reference, size, &mut checks);
    check_type::<i64>(engine, &reference, size, &mut checks);
    check_type::<u64>(engine, &reference, size, &mut checks);
    check_type::<f32>(engine, &reference, size, &mut checks);
    check_type::<f64>(engine, &reference, size, &mut checks);
    Ok(checks)
}

pub fn print(engine: &Engine, size: usize, checks: &[Check]) {
    println!("Verifying {} against FPU ({size} elements per buffer)", engine.name());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Type", "Operation", "Offsets", "Mismatches", "Result"]);
    for check in checks {
        let result = if check.passed() {
            Cell::new("PASS").fg(Color::Green)
        } else {
            Cell::new("FAIL").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(check.element),
            Cell::new(check.operation),
            Cell::new(check.offsets),
            Cell::new(check.mismatches),
            result,
        ]);
    }
    println!("{table}");

    let passed = checks.iter().filter(|c| c.passed()).count();
    println!("{passed}/{} checks passed", checks.len());
}
