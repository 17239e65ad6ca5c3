//! Type unit: one plain struct per message, fields in declaration order.

use std::fmt::{self, Write};

use super::GENERATED_MARKER;
use crate::model::{CompilationUnit, Message};
use crate::writer::ArtifactNames;

pub fn render(unit: &CompilationUnit, names: &ArtifactNames) -> Result<String, fmt::Error> {
    let guard = names.include_guard("RPC_TYPES_H");
    let mut h = String::new();

    h.push_str(GENERATED_MARKER);
    writeln!(h, "#ifndef {guard}")?;
    writeln!(h, "#define {guard}")?;
    writeln!(h)?;
    writeln!(h, "#include <cstdint>")?;
    writeln!(h)?;
    writeln!(h, "// Field order below is the wire layout. The structs are laid")?;
    writeln!(h, "// directly onto NIC buffers and are not packed: padding follows")?;
    writeln!(h, "// the compiler's native layout rules, so client and server must")?;
    writeln!(h, "// be built with ABI-compatible compilers.")?;
    writeln!(h)?;

    for msg in &unit.messages {
        write_struct(&mut h, msg)?;
        writeln!(h)?;
    }

    writeln!(h, "#endif\t// {guard}")?;
    Ok(h)
}

fn write_struct(h: &mut String, msg: &Message) -> fmt::Result {
    writeln!(h, "// declared size: {} bytes", msg.declared_size())?;
    writeln!(h, "struct {} {{", msg.name)?;
    for field in &msg.fields {
        match field.array_len {
            Some(len) => writeln!(h, "\t{} {}[{}];", field.ty.target_name(), field.name, len)?,
            None => writeln!(h, "\t{} {};", field.ty.target_name(), field.name)?,
        }
    }
    writeln!(h, "}};")
}
