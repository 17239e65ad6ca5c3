//! Client stub unit: one non-blocking call per method.

use std::fmt::Write;

use super::{
    EmitError, GENERATED_MARKER, Layout, WriteParams, WriteTemplate, bind_skeleton, expand_write,
};
use crate::processor::{ResolvedMethod, ResolvedService};
use crate::writer::ArtifactNames;
use crate::writer::template::Accumulator;

/// Bits of the composite rpc id taken by the client id; the per-client
/// call counter sits above them.
pub const CLIENT_ID_BITS: u32 = 16;

const GUARD_STEM: &str = "RPC_CLIENT_NONBLOCKING_H";

const SKELETON_HEADER: &str = r#"#ifndef <INCLUDE_GUARD>
#define <INCLUDE_GUARD>

#include "logger.h"
#include "rpc_client_nonblocking_base.h"
#include "utils.h"

#include "<TYPES_HEADER>"

#include <cassert>
#include <cstring>
#include <immintrin.h>

namespace dagger {

class RpcClient: public RpcClientNonBlock_Base {
public:
	RpcClient(const Nic* nic, size_t nic_flow_id, uint16_t client_id):
		RpcClientNonBlock_Base(nic, nic_flow_id, client_id) {}
	virtual ~RpcClient() {}

	virtual void abstract_class() const { return; }

	// Remote function section
"#;

const SKELETON_FOOTER: &str = r#"
};

}  // namespace dagger

#endif // <INCLUDE_GUARD>
"#;

pub fn render(
    service: &ResolvedService<'_>,
    names: &ArtifactNames,
    template: &WriteTemplate,
) -> Result<String, EmitError> {
    let mut code = Accumulator::new();

    code.append(GENERATED_MARKER);
    code.append(SKELETON_HEADER);
    for m in &service.methods {
        let stub = render_stub(m, template)?;
        code.append_nested(&stub);
    }
    code.append(SKELETON_FOOTER);
    bind_skeleton(&mut code, names, GUARD_STEM);

    Ok(code.into_text())
}

fn render_stub(m: &ResolvedMethod<'_>, template: &WriteTemplate) -> Result<Accumulator, EmitError> {
    let arg = &m.arg.name;
    let mut f = Accumulator::new();

    let mut head = String::new();
    writeln!(head)?;
    writeln!(head, "\tint {}(const {arg}& args) {{", m.method.name)?;
    writeln!(head, "\t\t// Get current buffer pointer")?;
    writeln!(head, "\t\tuint8_t change_bit;")?;
    writeln!(head, "\t\tchar* tx_ptr = tx_queue_.get_write_ptr(change_bit);")?;
    writeln!(head, "\t\tif (tx_ptr >= nic_->get_tx_buff_end()) {{")?;
    writeln!(head, "\t\t\tFRPC_ERROR(\"Nic tx buffer overflow \\n\");")?;
    writeln!(head, "\t\t\treturn 1;")?;
    writeln!(head, "\t\t}}")?;
    writeln!(
        head,
        "\t\tassert(reinterpret_cast<size_t>(tx_ptr) % nic_->get_mtu_size_bytes() == 0);"
    )?;
    writeln!(head)?;
    writeln!(head, "\t\t// Make RPC id")?;
    writeln!(
        head,
        "\t\tuint32_t rpc_id = client_id_ | static_cast<uint32_t>(rpc_id_cnt_ << {CLIENT_ID_BITS});"
    )?;
    writeln!(head)?;
    f.append(&head);

    let params = WriteParams {
        tx_queue: "tx_queue_",
        conn_id: "c_id_",
        rpc_id: "rpc_id",
        num_of_frames: 1,
        function_id: m.method.id.to_string(),
        arg_len: format!("sizeof({arg})"),
        req_type: "rpc_request",
    };
    expand_write(&mut f, template, &params, |layout| match layout {
        Layout::Mmio => format!(
            "\t\tmemcpy(request.argv, reinterpret_cast<const void*>(&args), sizeof({arg}));"
        ),
        Layout::Polling | Layout::Dma => {
            format!("\t\t*reinterpret_cast<{arg}*>(tx_ptr_casted->argv) = args;")
        }
    })?;

    f.append("\n\t\t++rpc_id_cnt_;\n\n\t\treturn 0;\n\t}\n");
    Ok(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::processor::resolve_service;

    const ECHO: &str = "\
message Req {
    int32 a;
}
message Resp {
    int32 b;
}
service Echo {
    rpc ping(Req) returns (Resp);
    rpc pong(Resp) returns (Req);
}
";

    fn client() -> String {
        let unit = parse(ECHO).unwrap();
        let resolved = resolve_service(&unit, &unit.services[0]).unwrap();
        let names = ArtifactNames::for_service("Echo", 1);
        render(&resolved, &names, &WriteTemplate::Builtin).unwrap()
    }

    #[test]
    fn one_stub_per_method() {
        let code = client();
        assert!(code.starts_with(GENERATED_MARKER));
        assert!(code.contains("\tint ping(const Req& args) {"));
        assert!(code.contains("\tint pong(const Resp& args) {"));
        assert!(code.contains("#include \"rpc_types.h\""));
        assert!(code.contains("#ifndef _RPC_CLIENT_NONBLOCKING_H_"));
        assert!(code.contains("request.hdr.fn_id = 0;"));
        assert!(code.contains("request.hdr.fn_id = 1;"));
        assert!(code.contains("request.hdr.argl = sizeof(Req);"));
        assert!(code.contains("tx_ptr_casted->hdr.argl = sizeof(Resp);"));
    }

    #[test]
    fn overrun_guard_precedes_the_write() {
        let code = client();
        let stub = &code[code.find("int ping(").unwrap()..code.find("int pong(").unwrap()];

        let guard = stub.find("if (tx_ptr >= nic_->get_tx_buff_end()) {").unwrap();
        let first_write = stub.find("request.hdr.c_id = c_id_;").unwrap();
        let counter = stub.find("++rpc_id_cnt_;").unwrap();
        assert!(guard < first_write);
        assert!(first_write < counter);
        assert_eq!(stub.matches("++rpc_id_cnt_;").count(), 1);
        assert!(stub.trim_end().ends_with("return 0;\n\t}"));
    }

    #[test]
    fn payload_fanned_across_layouts() {
        let code = client();
        assert_eq!(
            code.matches("memcpy(request.argv, reinterpret_cast<const void*>(&args), sizeof(Req));")
                .count(),
            1
        );
        assert_eq!(code.matches("*reinterpret_cast<Req*>(tx_ptr_casted->argv) = args;").count(), 2);
        assert!(code.contains("rpc_id = client_id_ | static_cast<uint32_t>(rpc_id_cnt_ << 16);"));
        assert!(code.contains("tx_queue_.notify_nic_of_new_dma();"));
    }
}
