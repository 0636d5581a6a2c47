//! The message handlers of the keygen protocol, one module per message.

mod finish;
mod key_gen;
mod new_op_cu;
mod opcu_migration;
mod pre_key_gen;
mod wait_sign;
