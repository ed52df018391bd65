//! Issues raised while parsing workflow conditions and activity definitions.

use super::{Issue, Reported};

pub const CONDITION_SYNTAX_ERROR: &str = "WF_CONDITION_SYNTAX_ERROR";
pub const CONDITION_MISSING_RP: &str = "WF_CONDITION_MISSING_RP";
pub const CONDITION_INVALID_NAME: &str = "WF_CONDITION_INVALID_NAME";
pub const CONDITION_UNEXPECTED_END: &str = "WF_CONDITION_UNEXPECTED_END";
pub const ILLEGAL_ITERATION_STYLE: &str = "WF_ILLEGAL_ITERATION_STYLE";
pub const ILLEGAL_OPERATION: &str = "WF_ILLEGAL_OPERATION";
pub const ACTIVITY_NO_NAME: &str = "WF_ACTIVITY_NO_NAME";
pub const ITERATOR_NOT_ONE_ACTIVITY: &str = "WF_ITERATOR_NOT_ONE_ACTIVITY";

pub static CONDITION_SYNTAX_ERROR_ISSUE: Issue = Issue::hard(
    CONDITION_SYNTAX_ERROR,
    "syntax error in condition '%{text}' at position %{pos}",
);
pub static CONDITION_MISSING_RP_ISSUE: Issue = Issue::hard(
    CONDITION_MISSING_RP,
    "expected right parenthesis in condition '%{text}' at position %{pos}",
);
pub static CONDITION_INVALID_NAME_ISSUE: Issue = Issue::hard(
    CONDITION_INVALID_NAME,
    "invalid name '%{name}' in condition '%{text}' at position %{pos}",
);
pub static CONDITION_UNEXPECTED_END_ISSUE: Issue = Issue::hard(
    CONDITION_UNEXPECTED_END,
    "unexpected end of condition '%{text}' at position %{pos}",
);
pub static ILLEGAL_ITERATION_STYLE_ISSUE: Issue =
    Issue::hard(ILLEGAL_ITERATION_STYLE, "no such iteration style '%{style}'");
pub static ILLEGAL_OPERATION_ISSUE: Issue =
    Issue::hard(ILLEGAL_OPERATION, "no such operation '%{operation}'");
pub static ACTIVITY_NO_NAME_ISSUE: Issue =
    Issue::hard(ACTIVITY_NO_NAME, "an activity must have a name");
pub static ITERATOR_NOT_ONE_ACTIVITY_ISSUE: Issue = Issue::hard(
    ITERATOR_NOT_ONE_ACTIVITY,
    "an iterator must have exactly one activity",
);

pub static ISSUES: [&Issue; 8] = [
    &CONDITION_SYNTAX_ERROR_ISSUE,
    &CONDITION_MISSING_RP_ISSUE,
    &CONDITION_INVALID_NAME_ISSUE,
    &CONDITION_UNEXPECTED_END_ISSUE,
    &ILLEGAL_ITERATION_STYLE_ISSUE,
    &ILLEGAL_OPERATION_ISSUE,
    &ACTIVITY_NO_NAME_ISSUE,
    &ITERATOR_NOT_ONE_ACTIVITY_ISSUE,
];

pub fn condition_syntax_error(text: &str, pos: usize) -> Reported {
    Reported::new(
        &CONDITION_SYNTAX_ERROR_ISSUE,
        [("text", text.to_string()), ("pos", pos.to_string())],
    )
}

pub fn condition_missing_rp(text: &str, pos: usize) -> Reported {
    Reported::new(
        &CONDITION_MISSING_RP_ISSUE,
        [("text", text.to_string()), ("pos", pos.to_string())],
    )
}

pub fn condition_invalid_name(name: &str, text: &str, pos: usize) -> Reported {
    Reported::new(
        &CONDITION_INVALID_NAME_ISSUE,
        [
            ("name", name.to_string()),
            ("text", text.to_string()),
            ("pos", pos.to_string()),
        ],
    )
}

pub fn condition_unexpected_end(text: &str, pos: usize) -> Reported {
    Reported::new(
        &CONDITION_UNEXPECTED_END_ISSUE,
        [("text", text.to_string()), ("pos", pos.to_string())],
    )
}

pub fn illegal_iteration_style(style: &str) -> Reported {
    Reported::new(&ILLEGAL_ITERATION_STYLE_ISSUE, [("style", style)])
}

pub fn illegal_operation(operation: &str) -> Reported {
    Reported::new(&ILLEGAL_OPERATION_ISSUE, [("operation", operation)])
}

pub fn activity_no_name() -> Reported {
    Reported::new(&ACTIVITY_NO_NAME_ISSUE, std::iter::empty::<(&str, &str)>())
}

pub fn iterator_not_one_activity() -> Reported {
    Reported::new(
        &ITERATOR_NOT_ONE_ACTIVITY_ISSUE,
        std::iter::empty::<(&str, &str)>(),
    )
}
