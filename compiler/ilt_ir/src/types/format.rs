//! Human-readable type names for logs and test failures.

use std::fmt::Write;

use super::{ModifierKind, TypeId, TypeKind, TypePool};

impl TypePool {
    /// Render a reference the way metadata tools print full names.
    ///
    /// `System.Collections.Generic.IEnumerable`1<System.Int32>`,
    /// `System.String[,]`, `System.Int32&`, `T`.
    pub fn display(&self, id: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, id);
        out
    }

    fn write_type(&self, out: &mut String, id: TypeId) {
        match self.kind(id) {
            TypeKind::Primitive(_) | TypeKind::Named(_) => {
                out.push_str(self.qualified_name(id).unwrap_or("?"));
            }
            TypeKind::Array { rank, element } => {
                self.write_type(out, *element);
                out.push('[');
                for _ in 1..*rank {
                    out.push(',');
                }
                out.push(']');
            }
            TypeKind::Pointer { element } => {
                self.write_type(out, *element);
                out.push('*');
            }
            TypeKind::ByReference { element } => {
                self.write_type(out, *element);
                out.push('&');
            }
            TypeKind::FunctionPointer => out.push_str("method*"),
            TypeKind::GenericParam(param) => out.push_str(&param.name),
            TypeKind::GenericInstance { definition, args } => {
                self.write_type(out, *definition);
                out.push('<');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    self.write_type(out, *arg);
                }
                out.push('>');
            }
            TypeKind::Modified { inner, modifier } => {
                self.write_type(out, *inner);
                let suffix = match modifier {
                    ModifierKind::Required => "modreq",
                    ModifierKind::Optional => "modopt",
                    ModifierKind::Pinned => "pinned",
                };
                let _ = write!(out, " {suffix}");
            }
        }
    }
}
