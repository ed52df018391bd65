fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_files = [
        "proto/data.proto",
        "proto/service.proto",
        "proto/controller.proto",
    ];

    for proto_file in &proto_files {
        println!("cargo:rerun-if-changed={}", proto_file);
    }

    // Configure tonic code generation (outputs to OUT_DIR by default)
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&proto_files, &["proto"])?;

    Ok(())
}
