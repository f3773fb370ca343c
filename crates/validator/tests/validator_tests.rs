//! Integration tests for the Moonlet validator.

use moonlet_common::{Arg, Instruction, Opcode, Program};
use moonlet_validator::{validate, ValidationError};
use proptest::prelude::*;

fn op(opcode: Opcode) -> Instruction {
    Instruction::bare(opcode)
}

// ========================================================
// Valid programs
// ========================================================

#[test]
fn accept_function_with_call() {
    let p = Program::new(vec![
        Instruction::function("id", 1),
        op(Opcode::BeginScope),
        Instruction::named(Opcode::DeclareLocal, "x"),
        Instruction::named(Opcode::Assign, "x"),
        Instruction::push("x"),
        Instruction::with_int(Opcode::Return, 1),
        op(Opcode::EndScope),
        Instruction::push("\"hi\""),
        Instruction::push("id"),
        Instruction::with_int(Opcode::Call, 1),
        op(Opcode::Pop),
    ]);
    assert!(validate(&p).is_ok());
}

#[test]
fn accept_conditional_jumps() {
    let p = Program::new(vec![
        Instruction::push("true"),
        Instruction::with_int(Opcode::JumpNeg, 5),
        op(Opcode::BeginScope),
        op(Opcode::EndScope),
        Instruction::with_int(Opcode::Jump, 5),
    ]);
    assert!(validate(&p).is_ok());
}

// ========================================================
// Rejections
// ========================================================

#[test]
fn reject_string_jump_target() {
    let p = Program::new(vec![Instruction::new(
        Opcode::Jump,
        vec![Arg::Str("end".into())],
    )]);
    let errors = validate(&p).unwrap_err();
    assert!(matches!(errors[0], ValidationError::Shape(_)));
}

#[test]
fn reject_function_missing_param_count() {
    let p = Program::new(vec![
        Instruction::new(Opcode::Function, vec![Arg::Str("f".into())]),
        op(Opcode::BeginScope),
        op(Opcode::EndScope),
    ]);
    assert!(validate(&p).is_err());
}

#[test]
fn reject_unbalanced_function_body() {
    let p = Program::new(vec![
        Instruction::function("f", 0),
        op(Opcode::BeginScope),
        Instruction::with_int(Opcode::Return, 0),
    ]);
    let errors = validate(&p).unwrap_err();
    assert_eq!(errors, vec![ValidationError::UnclosedScope { at: 1 }]);
}

#[test]
fn reject_bad_push_literal() {
    let p = Program::new(vec![Instruction::push("\"a\\q\"")]);
    let errors = validate(&p).unwrap_err();
    assert!(matches!(
        errors[0],
        ValidationError::InvalidLiteral { at: 0, .. }
    ));
}

#[test]
fn errors_are_collected_across_passes() {
    let p = Program::new(vec![
        Instruction::push("1"),
        Instruction::named(Opcode::Assign, "not a name"),
        Instruction::with_int(Opcode::JumpPos, -4),
        op(Opcode::EndScope),
        Instruction::function("g", 0),
    ]);
    let errors = validate(&p).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::InvalidName { at: 1, .. })));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::JumpOutOfRange { at: 2, .. })));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::UnmatchedEndScope { at: 3 })));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::FunctionWithoutBody { at: 4 })));
}

// ========================================================
// Properties
// ========================================================

/// Nested scope blocks with filler statements between them.
fn balanced(depth: u32) -> BoxedStrategy<Vec<Instruction>> {
    let filler = prop_oneof![
        Just(vec![Instruction::push("1"), op(Opcode::Pop)]),
        Just(vec![Instruction::named(Opcode::DeclareLocal, "v")]),
    ];
    if depth == 0 {
        return filler.boxed();
    }
    prop::collection::vec(
        prop_oneof![filler, balanced(depth - 1).prop_map(|inner| {
            let mut block = vec![op(Opcode::BeginScope)];
            block.extend(inner);
            block.push(op(Opcode::EndScope));
            block
        })],
        0..4,
    )
    .prop_map(|parts| parts.into_iter().flatten().collect())
    .boxed()
}

proptest! {
    #[test]
    fn balanced_blocks_validate(instrs in balanced(3)) {
        prop_assert!(validate(&Program::new(instrs)).is_ok());
    }

    #[test]
    fn dropping_an_end_scope_is_caught(instrs in balanced(3)) {
        let last_end = instrs.iter().rposition(|i| i.opcode == Opcode::EndScope);
        if let Some(index) = last_end {
            let mut broken = instrs.clone();
            broken.remove(index);
            let errors = validate(&Program::new(broken)).unwrap_err();
            prop_assert!(errors
                .iter()
                .all(|e| matches!(e, ValidationError::UnclosedScope { .. })),
                "expected only UnclosedScope errors, got {:?}", errors);
        }
    }
}
