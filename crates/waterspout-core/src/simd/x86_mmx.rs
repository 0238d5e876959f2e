//! MMX tier: 64-bit packed integer kernels for 8/16/32-bit types.
//!
//! `__m64` has no Rust intrinsics, so each vector body is a single inline
//! assembly loop. MMX registers alias the x87 stack: every loop ends with
//! `emms` inside the same `asm!` block, leaving the FPU usable afterwards.

use std::arch::asm;
use std::mem::size_of_val;

use super::kernels::{KernelTable, Kernels, Outcome};
use super::unroll::{misalignment, Split, Stride};
use crate::element::Element;

/// 8 bytes per register; tiny buffers stay scalar.
pub(super) const STRIDE: Stride = Stride::new(8, 16);

macro_rules! row {
    ($t:ty, $add:ident, $sub:ident) => {
        Kernels {
            add: Some($add),
            sub: Some($sub),
            ..Kernels::moves(clear::<$t>, set::<$t>, copy::<$t>)
        }
    };
}

pub(super) const TABLE: KernelTable = KernelTable {
    i8: row!(i8, add_i8, sub_i8),
    u8: row!(u8, add_u8, sub_u8),
    i16: row!(i16, add_i16, sub_i16),
    u16: row!(u16, add_u16, sub_u16),
    i32: row!(i32, add_i32, sub_i32),
    u32: row!(u32, add_u32, sub_u32),
    ..KernelTable::NONE
};

/// Threshold and alignment checks shared by every MMX kernel.
fn partition<T>(dst: &[T], sources: &[*const T]) -> Option<Split> {
    if dst.len() < STRIDE.min_len {
        return None;
    }
    let misalign = misalignment(dst.as_ptr(), STRIDE.bytes);
    if sources
        .iter()
        .any(|&src| misalignment(src, STRIDE.bytes) != misalign)
    {
        return None;
    }
    Split::plan(dst.as_ptr(), dst.len(), STRIDE.bytes)
}

fn clear<T: Element>(buf: &mut [T]) -> Outcome {
    set(buf, T::ZERO)
}

fn set<T: Element>(buf: &mut [T], value: T) -> Outcome {
    let Some(split) = partition(buf, &[]) else {
        return Outcome::Fallback;
    };
    let (head, rest) = buf.split_at_mut(split.head);
    let (body, tail) = rest.split_at_mut(split.body);

    head.fill(value);
    let quads = size_of_val(body) / 8;
    if quads > 0 {
        // SAFETY: `body` is 8-byte aligned and spans exactly `quads` quadwords.
        // Reason: MMX has no intrinsics in Rust; `emms` restores the x87 tag word.
        unsafe {
            asm!(
                "movq mm0, r8",
                "2:",
                "movq qword ptr [rdi], mm0",
                "add rdi, 8",
                "dec rcx",
                "jnz 2b",
                "emms",
                inout("r8") value.splat_bits() => _,
                inout("rdi") body.as_mut_ptr() => _,
                inout("rcx") quads => _,
                clobber_abi("C"),
                options(nostack),
            );
        }
    }
    tail.fill(value);
    Outcome::Done
}

fn copy<T: Element>(src: &[T], dst: &mut [T]) -> Outcome {
    let Some(split) = partition(dst, &[src.as_ptr()]) else {
        return Outcome::Fallback;
    };
    let (src_head, src_rest) = src.split_at(split.head);
    let (src_body, src_tail) = src_rest.split_at(split.body);
    let (dst_head, dst_rest) = dst.split_at_mut(split.head);
    let (dst_body, dst_tail) = dst_rest.split_at_mut(split.body);

    dst_head.copy_from_slice(src_head);
    let quads = size_of_val(dst_body) / 8;
    if quads > 0 {
        // SAFETY: both bodies are 8-byte aligned, equally long, and span
        // `quads` quadwords; `dst_body` is exclusively borrowed.
        unsafe {
            asm!(
                "2:",
                "movq mm0, qword ptr [rsi]",
                "movq qword ptr [rdi], mm0",
                "add rsi, 8",
                "add rdi, 8",
                "dec rcx",
                "jnz 2b",
                "emms",
                inout("rsi") src_body.as_ptr() => _,
                inout("rdi") dst_body.as_mut_ptr() => _,
                inout("rcx") quads => _,
                clobber_abi("C"),
                options(nostack),
            );
        }
    }
    dst_tail.copy_from_slice(src_tail);
    Outcome::Done
}

macro_rules! mmx_binary {
    ($($name:ident: $t:ty => $op:ident, $instruction:literal;)*) => {$(
        fn $name(a: &[$t], b: &[$t], dst: &mut [$t]) -> Outcome {
            let Some(split) = partition(dst, &[a.as_ptr(), b.as_ptr()]) else {
                return Outcome::Fallback;
            };
            let (a_head, a_rest) = a.split_at(split.head);
            let (a_body, a_tail) = a_rest.split_at(split.body);
            let (b_head, b_rest) = b.split_at(split.head);
            let (b_body, b_tail) = b_rest.split_at(split.body);
            let (d_head, d_rest) = dst.split_at_mut(split.head);
            let (d_body, d_tail) = d_rest.split_at_mut(split.body);

            for ((d, &x), &y) in d_head.iter_mut().zip(a_head).zip(b_head) {
                *d = <$t as Element>::$op(x, y);
            }
            let quads = size_of_val(d_body) / 8;
            if quads > 0 {
                // SAFETY: all three bodies are 8-byte aligned, equally long,
                // and span `quads` quadwords; `d_body` is exclusively borrowed.
                unsafe {
                    asm!(
                        "2:",
                        "movq mm0, qword ptr [rsi]",
                        concat!($instruction, " mm0, qword ptr [rdx]"),
                        "movq qword ptr [rdi], mm0",
                        "add rsi, 8",
                        "add rdx, 8",
                        "add rdi, 8",
                        "dec rcx",
                        "jnz 2b",
                        "emms",
                        inout("rsi") a_body.as_ptr() => _,
                        inout("rdx") b_body.as_ptr() => _,
                        inout("rdi") d_body.as_mut_ptr() => _,
                        inout("rcx") quads => _,
                        clobber_abi("C"),
                        options(nostack),
                    );
                }
            }
            for ((d, &x), &y) in d_tail.iter_mut().zip(a_tail).zip(b_tail) {
                *d = <$t as Element>::$op(x, y);
            }
            Outcome::Done
        }
    )*};
}

mmx_binary! {
    add_i8: i8 => add, "paddb";
    add_u8: u8 => add, "paddb";
    add_i16: i16 => add, "paddw";
    add_u16: u16 => add, "paddw";
    add_i32: i32 => add, "paddd";
    add_u32: u32 => add, "paddd";
    sub_i8: i8 => sub, "psubb";
    sub_u8: u8 => sub, "psubb";
    sub_i16: i16 => sub, "psubw";
    sub_u16: u16 => sub, "psubw";
    sub_i32: i32 => sub, "psubd";
    sub_u32: u32 => sub, "psubd";
}
