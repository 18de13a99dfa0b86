/// Binary entrypoint for the `passgen` executable.
///
/// Keeps the binary thin — all business logic lives in the `passgen_lib` crate
/// so unit tests can import library functions directly.
fn main() {
    passgen_lib::run();
}
