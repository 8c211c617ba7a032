//! Scope chain: lexical frames mapping names to variables and functions.
//!
//! Frames live in a [`ScopeArena`] and are addressed by [`ScopeId`]; AST
//! nodes refer to the frame they were validated in by id, never by ownership.
//! Lookup walks from the innermost frame outward and the first match wins.
//! Functions are only ever declared in the global frame.
//!
//! Every frame also lays out its own stack storage: locals are placed in
//! declaration order with natural alignment, parameters in 4-byte slots.

use rustc_hash::FxHashMap;
use wacc_core::{CompilationError, FuncType, Span, Type, WORD};

// ============================================================================
// Types
// ============================================================================

/// Index of a frame in the [`ScopeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The outermost frame, holding every function.
    pub const GLOBAL: ScopeId = ScopeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a variable in the [`ScopeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(u32);

impl VarId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    /// Parameters and top-level locals of the named function.
    Function(String),
    /// The main program body, or an `if`/`while`/`begin` body.
    Block,
}

/// Where a variable is stored, as a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Offset into the caller-pushed argument area.
    Param(u32),
    /// Offset into the frame's local area.
    Local(u32),
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    /// Frame that declares the variable.
    pub scope: ScopeId,
    pub storage: Storage,
    pub span: Span,
}

/// A registered function signature.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncIdent {
    pub name: String,
    pub sig: FuncType,
    /// Parameter names, in order (duplicates retained).
    pub param_names: Vec<String>,
    pub span: Span,
}

impl FuncIdent {
    pub fn returns(&self) -> &Type {
        &self.sig.returns
    }

    pub fn params(&self) -> &[Type] {
        &self.sig.params
    }

    pub fn ty(&self) -> Type {
        Type::Func(Box::new(self.sig.clone()))
    }
}

/// What a name resolves to.
#[derive(Debug, Clone)]
pub enum Binding {
    Var(VarId),
    Func(FuncIdent),
}

/// One level of the scope chain.
#[derive(Debug)]
pub struct Frame {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    bindings: FxHashMap<String, Binding>,
    /// Variables in declaration order.
    vars: Vec<VarId>,
    locals_size: u32,
    params_size: u32,
}

impl Frame {
    fn new(parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            parent,
            kind,
            bindings: FxHashMap::default(),
            vars: Vec::new(),
            locals_size: 0,
            params_size: 0,
        }
    }

    /// Bytes reserved on the stack for this frame's locals, word aligned.
    pub fn locals_size(&self) -> u32 {
        self.locals_size.next_multiple_of(WORD)
    }

    /// Bytes of caller-pushed arguments.
    pub fn params_size(&self) -> u32 {
        self.params_size
    }

    pub fn vars(&self) -> &[VarId] {
        &self.vars
    }

    fn span_of(&self, name: &str, arena: &ScopeArena) -> Span {
        match self.bindings.get(name) {
            Some(Binding::Var(id)) => arena.var(*id).span,
            Some(Binding::Func(func)) => func.span,
            None => Span::default(),
        }
    }
}

// ============================================================================
// ScopeArena
// ============================================================================

/// Owner of every frame and variable of one compilation.
#[derive(Debug)]
pub struct ScopeArena {
    frames: Vec<Frame>,
    vars: Vec<Variable>,
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeArena {
    /// Create an arena holding only the global frame.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new(None, ScopeKind::Global)],
            vars: Vec::new(),
        }
    }

    /// Open a child frame of `parent`.
    pub fn push(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.frames.len() as u32);
        self.frames.push(Frame::new(Some(parent), kind));
        id
    }

    pub fn frame(&self, id: ScopeId) -> &Frame {
        &self.frames[id.index()]
    }

    pub fn var(&self, id: VarId) -> &Variable {
        &self.vars[id.index()]
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    // ==========================================================================
    // Declaration
    // ==========================================================================

    /// Declare a local variable in `scope`.
    ///
    /// Redeclaring a name in the same frame is an error; shadowing a name
    /// from an outer frame is not.
    pub fn declare_var(
        &mut self,
        scope: ScopeId,
        name: &str,
        ty: Type,
        span: Span,
    ) -> Result<VarId, CompilationError> {
        self.check_fresh(scope, name, span)?;

        let frame = &mut self.frames[scope.index()];
        let size = ty.size();
        let offset = frame.locals_size.next_multiple_of(size);
        frame.locals_size = offset + size;

        Ok(self.insert_var(scope, name, ty, Storage::Local(offset), span))
    }

    /// Declare a parameter in a function frame.
    ///
    /// Every parameter gets a slot, since the caller pushes one per argument.
    /// A repeated name keeps its first binding; reporting the duplicate is
    /// left to the caller.
    pub fn declare_param(&mut self, scope: ScopeId, name: &str, ty: Type, span: Span) -> VarId {
        let frame = &mut self.frames[scope.index()];
        let offset = frame.params_size;
        frame.params_size += WORD;
        self.insert_var(scope, name, ty, Storage::Param(offset), span)
    }

    /// Register a function signature in the global frame.
    pub fn declare_func(&mut self, func: FuncIdent) -> Result<(), CompilationError> {
        let global = &mut self.frames[ScopeId::GLOBAL.index()];
        if global.bindings.contains_key(&func.name) {
            return Err(CompilationError::DuplicateFunction {
                name: func.name,
                span: func.span,
            });
        }
        global.bindings.insert(func.name.clone(), Binding::Func(func));
        Ok(())
    }

    fn check_fresh(&self, scope: ScopeId, name: &str, span: Span) -> Result<(), CompilationError> {
        let frame = self.frame(scope);
        if frame.bindings.contains_key(name) {
            return Err(CompilationError::DuplicateDeclaration {
                name: name.to_string(),
                original: frame.span_of(name, self),
                span,
            });
        }
        Ok(())
    }

    fn insert_var(&mut self, scope: ScopeId, name: &str, ty: Type, storage: Storage, span: Span) -> VarId {
        let id = VarId(self.vars.len() as u32);
        self.vars.push(Variable {
            name: name.to_string(),
            ty,
            scope,
            storage,
            span,
        });
        let frame = &mut self.frames[scope.index()];
        frame.vars.push(id);
        frame
            .bindings
            .entry(name.to_string())
            .or_insert(Binding::Var(id));
        id
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Resolve a name, innermost frame first.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Binding> {
        self.chain(scope)
            .find_map(|id| self.frame(id).bindings.get(name))
    }

    /// Resolve a name to a variable, skipping function bindings.
    pub fn lookup_var(&self, scope: ScopeId, name: &str) -> Option<VarId> {
        self.chain(scope).find_map(|id| match self.frame(id).bindings.get(name) {
            Some(Binding::Var(var)) => Some(*var),
            _ => None,
        })
    }

    /// Resolve a function name. Functions only live in the global frame.
    pub fn lookup_func(&self, name: &str) -> Option<&FuncIdent> {
        match self.frame(ScopeId::GLOBAL).bindings.get(name) {
            Some(Binding::Func(func)) => Some(func),
            _ => None,
        }
    }

    /// Frames from `scope` outward to the global frame.
    pub fn chain(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), |id| self.frame(*id).parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(line: u32) -> Span {
        Span::new(line, 1, 1)
    }

    #[test]
    fn lookup_walks_outward() {
        let mut scopes = ScopeArena::new();
        let main = scopes.push(ScopeId::GLOBAL, ScopeKind::Block);
        let inner = scopes.push(main, ScopeKind::Block);

        let x = scopes.declare_var(main, "x", Type::Int, span(1)).unwrap();
        assert_eq!(scopes.lookup_var(inner, "x"), Some(x));
        assert_eq!(scopes.lookup_var(main, "y"), None);
    }

    #[test]
    fn shadowing_is_allowed_redeclaration_is_not() {
        let mut scopes = ScopeArena::new();
        let main = scopes.push(ScopeId::GLOBAL, ScopeKind::Block);
        let inner = scopes.push(main, ScopeKind::Block);

        let outer_x = scopes.declare_var(main, "x", Type::Int, span(1)).unwrap();
        let inner_x = scopes.declare_var(inner, "x", Type::Bool, span(2)).unwrap();
        assert_eq!(scopes.lookup_var(inner, "x"), Some(inner_x));
        assert_eq!(scopes.lookup_var(main, "x"), Some(outer_x));

        let err = scopes.declare_var(main, "x", Type::Char, span(3)).unwrap_err();
        assert_eq!(
            err,
            CompilationError::DuplicateDeclaration {
                name: "x".into(),
                original: span(1),
                span: span(3),
            }
        );
    }

    #[test]
    fn locals_are_naturally_aligned() {
        let mut scopes = ScopeArena::new();
        let main = scopes.push(ScopeId::GLOBAL, ScopeKind::Block);

        let c = scopes.declare_var(main, "c", Type::Char, span(1)).unwrap();
        let n = scopes.declare_var(main, "n", Type::Int, span(2)).unwrap();
        let b = scopes.declare_var(main, "b", Type::Bool, span(3)).unwrap();

        assert_eq!(scopes.var(c).storage, Storage::Local(0));
        assert_eq!(scopes.var(n).storage, Storage::Local(4));
        assert_eq!(scopes.var(b).storage, Storage::Local(8));
        assert_eq!(scopes.frame(main).locals_size(), 12);
    }

    #[test]
    fn params_take_word_slots_even_when_repeated() {
        let mut scopes = ScopeArena::new();
        let f = scopes.push(ScopeId::GLOBAL, ScopeKind::Function("f".into()));

        let first = scopes.declare_param(f, "x", Type::Char, span(1));
        let second = scopes.declare_param(f, "x", Type::Bool, span(1));

        assert_eq!(scopes.var(first).storage, Storage::Param(0));
        assert_eq!(scopes.var(second).storage, Storage::Param(4));
        assert_eq!(scopes.frame(f).params_size(), 8);
        assert_eq!(scopes.lookup_var(f, "x"), Some(first));
    }

    #[test]
    fn functions_live_in_the_global_frame() {
        let mut scopes = ScopeArena::new();
        let main = scopes.push(ScopeId::GLOBAL, ScopeKind::Block);
        let func = FuncIdent {
            name: "f".into(),
            sig: FuncType {
                returns: Type::Int,
                params: vec![],
            },
            param_names: vec![],
            span: span(1),
        };
        scopes.declare_func(func.clone()).unwrap();

        assert_eq!(scopes.lookup_func("f"), Some(&func));
        // A variable named like a function does not hide it, and vice versa.
        scopes.declare_var(main, "f", Type::Int, span(2)).unwrap();
        assert!(scopes.lookup_func("f").is_some());
        assert!(scopes.lookup_var(ScopeId::GLOBAL, "f").is_none());

        let dup = scopes.declare_func(func).unwrap_err();
        assert!(matches!(dup, CompilationError::DuplicateFunction { .. }));
    }
}
