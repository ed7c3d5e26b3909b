// SPDX-License-Identifier: CC0-1.0

//! Integer types used on the `libbitcoinconsensus` C boundary.

#![allow(non_camel_case_types)]

/// The C signed 32 bit integer type (`int`), used for results and error codes.
pub type c_int = i32;
/// The C unsigned 32 bit integer type (`unsigned int`), used for lengths, indices and flags.
pub type c_uint = u32;
