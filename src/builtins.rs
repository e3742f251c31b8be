pub mod effects;
pub mod lists;
pub mod logics;
pub mod math;

use crate::galena::{Galena, GalenaErr, GalenaProc};

pub fn handle_proc(proc: GalenaProc, args: &[Galena]) -> Result<Galena, GalenaErr> {
  match proc {
    // math
    GalenaProc::Add => math::add(args),
    GalenaProc::Minus => math::minus(args),
    GalenaProc::Multiply => math::multiply(args),
    GalenaProc::Divide => math::divide(args),
    GalenaProc::Rem => math::rem(args),
    GalenaProc::LessThan => math::less_than(args),
    GalenaProc::GreaterThan => math::greater_than(args),
    GalenaProc::LessEqual => math::less_equal(args),
    GalenaProc::GreaterEqual => math::greater_equal(args),
    // logics
    GalenaProc::Equal => logics::equal(args),
    GalenaProc::NotEqual => logics::not_equal(args),
    GalenaProc::IdenticalQ => logics::identical(args),
    GalenaProc::Not => logics::not(args),
    // lists
    GalenaProc::List => lists::list(args),
    GalenaProc::Cons => lists::cons_pair(args),
    GalenaProc::Car => lists::car(args),
    GalenaProc::Cdr => lists::cdr(args),
    GalenaProc::NilQ => lists::nil_question(args),
    // effects
    GalenaProc::Print => effects::print(args),
  }
}
