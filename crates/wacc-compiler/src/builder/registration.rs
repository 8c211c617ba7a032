//! Registration (phase 1): function signatures.
//!
//! Every function header is registered in the global frame before any
//! body is validated, so calls may reference functions declared later in
//! the file, including mutually recursive ones.
//!
//! ## Responsibilities
//!
//! - Resolve return and parameter types
//! - Open the function frame and lay out parameter slots
//! - Report repeated parameter names, once per name
//! - Report repeated function names; the first definition stays registered

use rustc_hash::FxHashMap;
use wacc_core::{CompilationError, FuncType};
use wacc_parser::ast::FuncDecl;

use super::AstBuilder;
use crate::ast::Param;
use crate::scope::{FuncIdent, ScopeId, ScopeKind};
use crate::type_resolver;

/// A registered function header, ready for its body to be validated.
#[derive(Debug)]
pub(crate) struct FuncHeader {
    pub ident: FuncIdent,
    pub params: Vec<Param>,
    /// Frame holding the parameters.
    pub scope: ScopeId,
    /// Header errors, reported ahead of the body's own errors.
    pub errors: Vec<CompilationError>,
}

/// Output of the registration phase.
#[derive(Debug, Default)]
pub(crate) struct RegistrationOutput {
    /// One header per function declaration, in source order.
    pub headers: Vec<FuncHeader>,
    /// Number of functions entered into the global frame.
    pub functions_registered: usize,
}

impl AstBuilder {
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn register_functions(&mut self, funcs: &[FuncDecl<'_>]) -> RegistrationOutput {
        let mut output = RegistrationOutput::default();

        for decl in funcs {
            let header = self.register_function(decl);
            if header.errors.iter().all(|e| !matches!(e, CompilationError::DuplicateFunction { .. })) {
                output.functions_registered += 1;
            }
            output.headers.push(header);
        }

        tracing::debug!(
            declared = funcs.len(),
            registered = output.functions_registered,
            "registered function signatures"
        );
        output
    }

    fn register_function(&mut self, decl: &FuncDecl<'_>) -> FuncHeader {
        let name = decl.ident.name;
        let scope = self
            .scopes
            .push(ScopeId::GLOBAL, ScopeKind::Function(name.to_string()));

        let mut params = Vec::with_capacity(decl.params.len());
        let mut param_types = Vec::with_capacity(decl.params.len());
        for param in decl.params {
            let ty = type_resolver::resolve(&param.ty);
            let var = self
                .scopes
                .declare_param(scope, param.ident.name, ty.clone(), param.ident.span);
            params.push(Param {
                name: param.ident.name.to_string(),
                var,
            });
            param_types.push(ty);
        }

        let ident = FuncIdent {
            name: name.to_string(),
            sig: FuncType {
                returns: type_resolver::resolve(&decl.return_type),
                params: param_types,
            },
            param_names: params.iter().map(|p| p.name.clone()).collect(),
            span: decl.ident.span,
        };

        // The name precedes the parameter list in the source.
        let mut errors: Vec<_> = self.scopes.declare_func(ident.clone()).err().into_iter().collect();
        errors.extend(duplicate_params(decl));

        FuncHeader {
            ident,
            params,
            scope,
            errors,
        }
    }
}

/// One `DuplicateParam` per repeated name, at its second occurrence.
fn duplicate_params(decl: &FuncDecl<'_>) -> Vec<CompilationError> {
    let mut seen: FxHashMap<&str, usize> = FxHashMap::default();
    let mut errors = Vec::new();
    for param in decl.params {
        let count = seen.entry(param.ident.name).or_default();
        *count += 1;
        if *count == 2 {
            errors.push(CompilationError::DuplicateParam {
                name: param.ident.name.to_string(),
                span: param.ident.span,
            });
        }
    }
    errors
}
