//! Tests of the keygen protocol, driven through [`KeyGenHandler`](crate::KeyGenHandler).

mod test_key_gen_finish;
mod test_key_gen_wait_sign;
mod test_opcu_migration;
mod test_scenarios;
