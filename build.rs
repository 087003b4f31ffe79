fn main() {
    // ESP-IDF link arguments are only needed for the firmware image; host
    // builds and tests run without the embuild toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
