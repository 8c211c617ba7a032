//! Result types of operator application.
//!
//! Only called once every operand has validated, so an operator never
//! layers its own error on top of a broken operand.
//!
//! | operators            | operands              | result |
//! |----------------------|-----------------------|--------|
//! | `* / % + -`          | int, int              | int    |
//! | `< <= > >=`          | int, int / char, char | bool   |
//! | `== !=`              | any two equal types   | bool   |
//! | `&& \|\|`            | bool, bool            | bool   |
//! | `!`                  | bool                  | bool   |
//! | unary `-`            | int                   | int    |
//! | `len`                | array                 | int    |
//! | `ord`                | char                  | int    |
//! | `chr`                | int                   | char   |

mod binary;
mod unary;

pub use binary::resolve_binary;
pub use unary::resolve_unary;
