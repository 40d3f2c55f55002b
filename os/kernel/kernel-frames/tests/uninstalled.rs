use kernel_frames::global;

#[test]
#[should_panic(expected = "used before installation")]
fn kernel_pool_is_fatal_before_install() {
    let _ = global::kalloc();
}
