//! Operators command handler

use crate::cli::OperatorsArgs;
use crate::error::Result;
use crate::output::OutputWriter;
use karta_core::{Kernel, OperatorCategory, OperatorQuery};

/// Handle the operators command
pub fn handle_operators(args: OperatorsArgs, kernel: &Kernel, output: &mut OutputWriter) -> Result<()> {
    let mut query = OperatorQuery::all();
    if let Some(category) = args.category {
        query = query.category(OperatorCategory::from(category));
    }
    if let Some(language) = args.language {
        query = query.language(language);
    }

    let operators = kernel.list_operators(&query);
    output.operators(&operators)?;
    output.info(&format!("{} of {} operator(s)", operators.len(), kernel.registry().len()))
}
