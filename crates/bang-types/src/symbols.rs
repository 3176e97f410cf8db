//! Two-level symbol table: one global scope for the whole program and a
//! stack of function frames.
//!
//! Global slots come from two counters, one for plain values (standard and
//! array types) and one for functions. Local slots are numbered per frame,
//! arguments first.

use ahash::AHashMap;
use bang_ast::types::Type;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlobalCounts {
    pub values: u32,
    pub functions: u32,
}

#[derive(Debug, Default)]
struct Frame {
    symbols: AHashMap<String, Symbol>,
    next_index: u32,
}

impl Frame {
    fn define(&mut self, name: &str, ty: Type) -> Symbol {
        let index = match self.symbols.get(name) {
            Some(existing) => existing.index,
            None => {
                let i = self.next_index;
                self.next_index += 1;
                i
            }
        };
        let sym = Symbol { name: name.to_string(), ty, index };
        self.symbols.insert(sym.name.clone(), sym.clone());
        sym
    }
}

#[derive(Debug, Default)]
pub struct SymbolController {
    global: AHashMap<String, Symbol>,
    num_globals: u32,
    num_functions: u32,
    frames: Vec<Frame>,
}

impl SymbolController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` in the innermost scope. Re-binding a name keeps its slot.
    pub fn define_variable(&mut self, name: &str, ty: Type) -> Symbol {
        if let Some(frame) = self.frames.last_mut() {
            let sym = frame.define(name, ty);
            debug!(name, ty = %sym.ty, index = sym.index, scope = "local", "symbol defined");
            return sym;
        }
        let index = match self.global.get(name) {
            Some(existing) => existing.index,
            None if ty.is_function() => {
                self.num_functions += 1;
                self.num_functions - 1
            }
            None => {
                self.num_globals += 1;
                self.num_globals - 1
            }
        };
        let sym = Symbol { name: name.to_string(), ty, index };
        debug!(name, ty = %sym.ty, index, scope = "global", "symbol defined");
        self.global.insert(sym.name.clone(), sym.clone());
        sym
    }

    /// Reserve a function slot for a literal that is never bound to a name.
    pub fn define_anonymous_function(&mut self) -> u32 {
        self.num_functions += 1;
        debug!(index = self.num_functions - 1, "anonymous function slot");
        self.num_functions - 1
    }

    /// Enter a function body; its arguments take local slots `0..n`.
    pub fn push_function<'a>(&mut self, arguments: impl IntoIterator<Item = (&'a str, Type)>) {
        let mut frame = Frame::default();
        for (name, ty) in arguments {
            frame.define(name, ty);
        }
        debug!(depth = self.frames.len() + 1, arguments = frame.symbols.len(), "scope pushed");
        self.frames.push(frame);
    }

    pub fn pop_function(&mut self) {
        if self.frames.pop().is_some() {
            debug!(depth = self.frames.len(), "scope popped");
        }
    }

    /// Look in the current function frame, then in the global scope.
    pub fn resolve(&self, name: &str) -> Option<(&Symbol, ScopeKind)> {
        if let Some(sym) = self.frames.last().and_then(|f| f.symbols.get(name)) {
            return Some((sym, ScopeKind::Local));
        }
        self.global.get(name).map(|sym| (sym, ScopeKind::Global))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn counts(&self) -> GlobalCounts {
        GlobalCounts { values: self.num_globals, functions: self.num_functions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_counters_split_by_category() {
        let mut st = SymbolController::new();
        let a = st.define_variable("a", Type::int());
        let f = st.define_variable("f", Type::function(vec![], vec![Type::int()]));
        let xs = st.define_variable("xs", Type::array(Type::float()));
        let anon = st.define_anonymous_function();
        assert_eq!((a.index, f.index, xs.index, anon), (0, 0, 1, 1));
        assert_eq!(st.counts(), GlobalCounts { values: 2, functions: 2 });
    }

    #[test]
    fn locals_shadow_globals_until_popped() {
        let mut st = SymbolController::new();
        st.define_variable("x", Type::bool());
        st.push_function([("x", Type::int()), ("y", Type::int())]);
        let (sym, scope) = st.resolve("x").unwrap();
        assert_eq!((sym.ty.clone(), sym.index, scope), (Type::int(), 0, ScopeKind::Local));
        let z = st.define_variable("z", Type::float());
        assert_eq!(z.index, 2);
        st.pop_function();
        assert!(st.resolve("z").is_none());
        assert_eq!(st.resolve("x").unwrap().1, ScopeKind::Global);
        assert_eq!(st.counts().values, 1);
    }

    #[test]
    fn only_the_top_frame_is_visible() {
        let mut st = SymbolController::new();
        st.push_function([("outer", Type::int())]);
        st.push_function([("inner", Type::int())]);
        assert!(st.resolve("outer").is_none());
        assert_eq!(st.depth(), 2);
        st.pop_function();
        assert!(st.resolve("outer").is_some());
    }

    #[test]
    fn redefinition_keeps_the_slot() {
        let mut st = SymbolController::new();
        st.push_function(Vec::<(&str, Type)>::new());
        let first = st.define_variable("n", Type::int());
        let again = st.define_variable("n", Type::int());
        assert_eq!(first.index, again.index);
    }
}
