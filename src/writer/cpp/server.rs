//! Server dispatch unit.
//!
//! One `switch` on the request's function id, one arm per method labelled
//! by its numeric id. Each arm calls through the handler table at the same
//! index, then the shared write template sends the return payload back.

use std::fmt::Write;

use super::{EmitError, Layout, WriteParams, WriteTemplate, bind_skeleton, expand_write};
use crate::processor::{ResolvedMethod, ResolvedService};
use crate::writer::ArtifactNames;
use crate::writer::template::Accumulator;

const GUARD_STEM: &str = "RPC_SERVER_CALLBACK_H";

const SKELETON_HEADER: &str = r#"#ifndef <INCLUDE_GUARD>
#define <INCLUDE_GUARD>

#include "logger.h"
#include "rpc_call.h"
#include "rpc_header.h"
#include "rpc_server_thread.h"
#include "rx_queue.h"
#include "utils.h"

#include "<TYPES_HEADER>"

#include <cstring>
#include <immintrin.h>

namespace dagger {

class RpcServerCallBack: public RpcServerCallBack_Base {
public:
	RpcServerCallBack(const std::vector<const void*>& rpc_fn_ptr):
		RpcServerCallBack_Base(rpc_fn_ptr) {}
	~RpcServerCallBack() {};

	virtual void operator()(const CallHandler handler,
	                        const RpcPckt* rpc_in, TxQueue& tx_queue) const final {
		uint8_t ret_buff[cfg::sys::cl_size_bytes];
		size_t ret_size;
		RpcRetCode ret_code;

		// Check the fn_id is within the scope
		if (rpc_in->hdr.fn_id > rpc_fn_ptr_.size() - 1) {
			FRPC_ERROR("Too large RPC function id is received, this call will stop here and "
			           "no value will be returned\n");
			return;
		}

"#;

const SKELETON_RET_CODE_CHECK: &str = r#"
		if (ret_code == RpcRetCode::Fail) {
			FRPC_ERROR("RPC returned an error, this call will stop here and "
			           "no value will be returned\n");
			return;
		}

		uint8_t change_bit;
		char* tx_ptr = tx_queue.get_write_ptr(change_bit);

"#;

const SKELETON_FOOTER: &str = r#"	}

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

    code.append(super::GENERATED_MARKER);
    code.append(SKELETON_HEADER);
    code.append(&dispatch_switch(&service.methods)?);
    code.append(SKELETON_RET_CODE_CHECK);

    // Responses echo the request's connection and rpc id.
    let params = WriteParams {
        tx_queue: "tx_queue",
        conn_id: "rpc_in->hdr.c_id",
        rpc_id: "rpc_in->hdr.rpc_id",
        num_of_frames: 1,
        function_id: "1".to_string(),
        arg_len: "ret_size".to_string(),
        req_type: "rpc_response",
    };
    expand_write(&mut code, template, &params, |layout| match layout {
        Layout::Mmio => "\t\tmemcpy(request.argv, ret_buff, ret_size);".to_string(),
        Layout::Polling | Layout::Dma => {
            "\t\tmemcpy(tx_ptr_casted->argv, ret_buff, ret_size);".to_string()
        }
    })?;

    code.append(SKELETON_FOOTER);
    bind_skeleton(&mut code, names, GUARD_STEM);
    Ok(code.into_text())
}

fn dispatch_switch(methods: &[ResolvedMethod<'_>]) -> Result<String, EmitError> {
    let mut s = String::new();
    writeln!(s, "\t\tswitch (rpc_in->hdr.fn_id) {{")?;
    for m in methods {
        let id = m.method.id;
        let (arg, ret) = (&m.arg.name, &m.ret.name);
        writeln!(s, "\t\t\tcase {id}: {{")?;
        writeln!(
            s,
            "\t\t\t\tret_code = (*reinterpret_cast<RpcRetCode(*)(CallHandler, {arg}, {ret}*)>(rpc_fn_ptr_[{id}]))(\
             handler, *reinterpret_cast<const {arg}*>(rpc_in->argv), reinterpret_cast<{ret}*>(ret_buff));"
        )?;
        writeln!(s, "\t\t\t\tret_size = sizeof({ret});")?;
        writeln!(s, "\t\t\t\tbreak;")?;
        writeln!(s, "\t\t\t}}")?;
    }
    writeln!(s, "\t\t\tdefault:")?;
    writeln!(s, "\t\t\t\treturn;")?;
    writeln!(s, "\t\t}}")?;
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::processor::resolve_service;

    const KVS: &str = "\
message GetReq {
    int64 timestamp;
    char[16] key;
}
message GetResp {
    int64 timestamp;
    char[32] value;
}
service Kvs {
    rpc get(GetReq) returns (GetResp);
    rpc touch(GetReq) returns (GetReq);
}
";

    #[test]
    fn one_arm_per_method_labelled_by_id() {
        let unit = parse(KVS).unwrap();
        let resolved = resolve_service(&unit, &unit.services[0]).unwrap();
        let names = ArtifactNames::for_service("Kvs", 1);
        let code = render(&resolved, &names, &WriteTemplate::Builtin).unwrap();

        assert!(code.starts_with(super::super::GENERATED_MARKER));
        assert!(code.contains("switch (rpc_in->hdr.fn_id) {"));

        let case0 = code.find("case 0: {").unwrap();
        let case1 = code.find("case 1: {").unwrap();
        assert!(case0 < case1);
        assert!(!code.contains("case 2:"));

        assert!(code.contains(
            "ret_code = (*reinterpret_cast<RpcRetCode(*)(CallHandler, GetReq, GetResp*)>(rpc_fn_ptr_[0]))(\
             handler, *reinterpret_cast<const GetReq*>(rpc_in->argv), reinterpret_cast<GetResp*>(ret_buff));"
        ));
        assert!(code.contains("ret_size = sizeof(GetResp);"));
        assert!(code.contains("rpc_fn_ptr_[1]"));
        assert!(code.contains("ret_size = sizeof(GetReq);"));
    }

    #[test]
    fn response_is_written_for_every_layout() {
        let unit = parse(KVS).unwrap();
        let resolved = resolve_service(&unit, &unit.services[0]).unwrap();
        let names = ArtifactNames::for_service("Kvs", 1);
        let code = render(&resolved, &names, &WriteTemplate::Builtin).unwrap();

        assert_eq!(code.matches("memcpy(request.argv, ret_buff, ret_size);").count(), 1);
        assert_eq!(code.matches("memcpy(tx_ptr_casted->argv, ret_buff, ret_size);").count(), 2);
        assert!(code.contains("request.hdr.c_id = rpc_in->hdr.c_id;"));
        assert!(code.contains("tx_ptr_casted->hdr.argl = ret_size;"));
        assert!(code.contains("tx_ptr_casted->hdr.ctl.req_type = rpc_response;"));
        assert!(code.contains("tx_queue.notify_nic_of_new_dma();"));
        assert!(code.trim_end().ends_with("#endif // _RPC_SERVER_CALLBACK_H_"));
    }

    #[test]
    fn includes_the_types_of_its_own_service() {
        let unit = parse(KVS).unwrap();
        let resolved = resolve_service(&unit, &unit.services[0]).unwrap();
        let names = ArtifactNames::for_service("Kvs", 2);
        let code = render(&resolved, &names, &WriteTemplate::Builtin).unwrap();

        assert!(code.contains("#include \"Kvs_rpc_types.h\""));
        assert!(!code.contains("#include \"rpc_types.h\""));
        assert!(code.contains(
            "#ifndef _KVS_RPC_SERVER_CALLBACK_H_\n#define _KVS_RPC_SERVER_CALLBACK_H_"
        ));
        assert!(code.trim_end().ends_with("#endif // _KVS_RPC_SERVER_CALLBACK_H_"));
        assert!(!code.contains("<INCLUDE_GUARD>"));
    }
}
