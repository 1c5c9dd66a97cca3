use crate::cell::Constness;
use crate::environment::Environment;
use pretty_assertions::assert_eq;
use tarn_intern::SharedInterner;
use tarn_value::Value;

#[test]
fn test_guard_pops_on_normal_exit() {
    let interner = SharedInterner::default();
    let mut env = Environment::new(interner);

    assert_eq!(env.depth(), 1);
    {
        let scoped = env.scoped();
        assert_eq!(scoped.depth(), 2);
    }
    assert_eq!(env.depth(), 1);
}

#[test]
fn test_guard_pops_on_panic() {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    let interner = SharedInterner::default();
    let mut env = Environment::new(interner);

    let result = catch_unwind(AssertUnwindSafe(|| {
        let scoped = env.scoped();
        assert_eq!(scoped.depth(), 2);
        panic!("test panic");
    }));

    assert!(result.is_err());
    // Scope popped by Drop during unwinding
    assert_eq!(env.depth(), 1);
}

#[test]
fn test_with_scope_closure() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");
    let mut env = Environment::new(interner);

    let result = env.with_scope(|scoped| {
        match scoped.declare(x, Value::int(42), Constness::Mutable) {
            Ok(_) => {}
            Err(e) => panic!("declare failed: {e}"),
        }
        scoped.find(x).map(|c| c.value())
    });

    assert_eq!(result, Some(Value::int(42)));
    // Binding gone after scope exit
    assert!(env.find(x).is_none());
}

#[test]
fn test_with_scope_closure_panic() {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    let interner = SharedInterner::default();
    let x = interner.intern("x");
    let mut env = Environment::new(interner);

    let result = catch_unwind(AssertUnwindSafe(|| {
        env.with_scope(|scoped| {
            match scoped.declare(x, Value::int(42), Constness::Mutable) {
                Ok(_) => {}
                Err(e) => panic!("declare failed: {e}"),
            }
            assert_eq!(scoped.depth(), 2);
            panic!("closure panic");
        })
    }));

    assert!(result.is_err());
    assert_eq!(env.depth(), 1);
    assert!(env.find(x).is_none());
}

#[test]
fn test_nested_guards() {
    let interner = SharedInterner::default();
    let mut env = Environment::new(interner);

    env.with_scope(|scoped1| {
        assert_eq!(scoped1.depth(), 2);
        scoped1.with_scope(|scoped2| {
            assert_eq!(scoped2.depth(), 3);
        });
        assert_eq!(scoped1.depth(), 2);
    });
    assert_eq!(env.depth(), 1);
}

#[test]
fn test_guard_never_pops_the_global_floor() {
    let interner = SharedInterner::default();
    let mut env = Environment::new(interner);

    {
        let mut scoped = env.scoped();
        // A confused caller popping inside the guard must not let the
        // guard's own drop tear down the global frame.
        assert_eq!(scoped.exit_scope(), Ok(()));
        assert_eq!(scoped.depth(), 1);
    }
    assert_eq!(env.depth(), 1);
}

#[test]
fn test_early_return_still_cleans_up() {
    let interner = SharedInterner::default();
    let x = interner.intern("early");

    fn helper(env: &mut Environment, x: tarn_intern::Name) -> Option<i64> {
        let mut scoped = env.scoped();
        match scoped.declare(x, Value::int(999), Constness::Mutable) {
            Ok(_) => {}
            Err(e) => panic!("declare failed: {e}"),
        }
        // Early return - scope still cleaned up by the guard
        Some(42)
    }

    let mut env = Environment::new(interner);
    assert_eq!(env.depth(), 1);
    assert_eq!(helper(&mut env, x), Some(42));
    assert_eq!(env.depth(), 1);
    assert!(env.find(x).is_none());
}
