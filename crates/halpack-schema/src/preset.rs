use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub recipe: &'static str,
}

pub const BUILTIN_PRESETS: &[Preset] = &[
    Preset {
        name: "stm32f4",
        description: "libhal-stm32f4 with an open platform option; stm32f411re selects a linker script",
        recipe: r#"recipe_version = 1

[package]
name = "libhal-stm32f4"
version = "0.0.1"
license = "Apache-2.0"
url = "https://github.com/conan-io/conan-center-index"
homepage = "https://libhal.github.io/libhal-stm32f4"
description = "A collection of drivers and libraries for the stm32f4 series microcontrollers."
topics = ["microcontroller", "stm32f4"]

[options.platform]
default = "ANY"
linker_scripts = ["stm32f411re"]

[requires]
libhal = "^2.0.1"
libhal-util = "^3.0.0"
libhal-armcortex = "^2.0.3"

[tool_requires]
cmake = "3.27.1"
libhal-cmake-util = "2.2.0"

[test_requires]
libhal-mock = "^2.0.1"
boost-ext-ut = "1.1.9"

[build]
toolchain = "cmake"
min_cppstd = "20"
exports_sources = ["include/*", "linker_scripts/*", "tests/*", "LICENSE", "CMakeLists.txt", "src/*"]

[build.compiler_minimum]
gcc = "11"
clang = "14"
apple-clang = "14.0.0"

[package_info]
cmake_target_name = "libhal::stm32f4"
libs = ["libhal-stm32f4"]
linker_script_namespace = "libhal-stm32f4"
"#,
    },
    Preset {
        name: "stm32f4-profiles",
        description: "libhal-stm32f4 with the platform restricted to profile1, profile2 or ANY",
        recipe: r#"recipe_version = 1

[package]
name = "libhal-stm32f4"
version = "0.0.1"
license = "Apache-2.0"
url = "https://github.com/conan-io/conan-center-index"
homepage = "https://libhal.github.io/libhal-stm32f4"
description = "A collection of drivers and libraries for the stm32f4 series microcontrollers."
topics = ["microcontroller", "stm32f4"]

[options.platform]
default = "ANY"
allowed = ["profile1", "profile2", "ANY"]
linker_scripts = ["profile1", "profile2"]

[requires]
libhal = "^2.0.1"
libhal-util = "^3.0.0"
libhal-armcortex = "^2.0.3"

[tool_requires]
cmake = "3.27.1"
libhal-cmake-util = "2.2.0"

[test_requires]
libhal-mock = "^2.0.1"
boost-ext-ut = "1.1.9"

[build]
toolchain = "cmake"
min_cppstd = "20"
exports_sources = ["include/*", "linker_scripts/*", "tests/*", "LICENSE", "CMakeLists.txt", "src/*"]

[build.compiler_minimum]
gcc = "11"
clang = "14"
apple-clang = "14.0.0"

[package_info]
cmake_target_name = "libhal::stm32f4"
libs = ["libhal-stm32f4"]
"#,
    },
];

pub fn get_preset(name: &str) -> Option<&'static Preset> {
    BUILTIN_PRESETS.iter().find(|p| p.name == name)
}

pub fn list_presets() -> &'static [Preset] {
    BUILTIN_PRESETS
}
