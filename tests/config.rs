mod tests {
    use std::io;
    use std::net::{SocketAddr, UdpSocket};
    use std::time::Duration;

    use led_fanout::config::{BulbConfig, GridConfig, UdpConfig};
    use led_fanout::sink::{GridDriver, StripDriver};
    use led_fanout::{
        DeviceKind, Error, GammaSource, GammaTable, GridDeviceKind, HardwareDrivers, HistoryGrid,
        LayoutMode, OutputConfig, Rgb,
    };

    struct NullStrip;

    impl StripDriver for NullStrip {
        fn set_pixel(&mut self, _index: usize, _packed: u32) {}

        fn show(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct NullGrid;

    impl GridDriver for NullGrid {
        fn apply_grid(&mut self, _device: GridDeviceKind, _grid: &HistoryGrid) -> io::Result<()> {
            Ok(())
        }

        fn set_static(&mut self, _device: GridDeviceKind, _color: Rgb) -> io::Result<()> {
            Ok(())
        }

        fn clear(&mut self, _device: GridDeviceKind) -> io::Result<()> {
            Ok(())
        }
    }

    const FULL: &str = r#"
pixel_count = 120
device = "direct"
gamma_table = { exponent = 2.2 }

[udp]
address = "10.0.0.2:7777"
mirror = "10.0.0.3:7777"

[grid]
enabled = true
mode = "full_resolution"

[[grid.layouts]]
device = "keypad"
samples = 5
width = 5
trail = true
cells = [{ sample = 0, x = 0, y = 0 }, { sample = 4, x = 4, y = 3 }]

[bulbs]
addresses = ["10.0.0.20:56700"]
kelvin = 2700
"#;

    #[test]
    fn test_defaults() {
        let config = OutputConfig::from_toml_str("").unwrap();
        assert_eq!(config, OutputConfig::default());
        assert_eq!(config.pixel_count, 60);
        assert_eq!(config.device_kind().unwrap(), DeviceKind::Udp);
        assert!(config.gamma_correction);
        assert_eq!(config.gamma_table, GammaSource::Builtin);
        assert_eq!(config.udp.address, SocketAddr::from(([192, 168, 0, 150], 7777)));
        assert!(!config.grid.enabled);
        assert!(!config.bulbs.enabled);
        assert_eq!(config.bulbs.kelvin, 3500);
    }

    #[test]
    fn test_parse_full_config() {
        let config = OutputConfig::from_toml_str(FULL).unwrap();
        assert_eq!(config.pixel_count, 120);
        assert_eq!(config.device_kind().unwrap(), DeviceKind::Direct);
        assert_eq!(config.gamma_table, GammaSource::Exponent(2.2));
        assert_eq!(config.udp.mirror, Some(SocketAddr::from(([10, 0, 0, 3], 7777))));
        assert_eq!(config.grid.mode, LayoutMode::FullResolution);

        let layouts = config.grid.layouts();
        assert_eq!(layouts.len(), 1);
        assert_eq!(layouts[0].device, GridDeviceKind::Keypad);
        assert_eq!(layouts[0].first_sample, 0);
        assert_eq!(layouts[0].cells[1].y, 3);

        assert_eq!(config.bulbs.kelvin, 2700);
        assert_eq!(config.bulbs.timeout_ms, 500);
    }

    #[test]
    fn test_unknown_device() {
        assert!(matches!(
            OutputConfig::from_toml_str("device = \"serial\""),
            Err(Error::UnknownDevice(name)) if name == "serial"
        ));
        assert_eq!("usb".parse::<DeviceKind>().unwrap(), DeviceKind::Usb);
        assert_eq!(DeviceKind::Direct.as_str(), "direct");
    }

    #[test]
    fn test_udp_strip_length_limit() {
        assert!(matches!(
            OutputConfig::from_toml_str("pixel_count = 300"),
            Err(Error::StripTooLong { len: 300, max: 256 })
        ));
        // Only the network protocol has the limit
        assert!(OutputConfig::from_toml_str("pixel_count = 300\ndevice = \"usb\"").is_ok());
    }

    #[test]
    fn test_invalid_options() {
        assert!(matches!(
            OutputConfig::from_toml_str("pixel_count = 0"),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            OutputConfig::from_toml_str("pixel_count = 40\n[grid]\nenabled = true\nmode = \"full_resolution\""),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            OutputConfig::from_toml_str("[bulbs]\nenabled = true"),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            OutputConfig::from_toml_str("pixel_count = \"many\""),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_gamma_selection() {
        let mut config = OutputConfig::default();
        assert_eq!(config.gamma().unwrap(), Some(GammaTable::builtin()));

        config.gamma_table = GammaSource::Exponent(1.0);
        assert_eq!(config.gamma().unwrap(), Some(GammaTable::identity()));

        config.gamma_table = GammaSource::Path("/nonexistent/led-fanout/gamma.txt".into());
        assert!(matches!(config.gamma(), Err(Error::Io(_))));

        config.gamma_correction = false;
        assert_eq!(config.gamma().unwrap(), None);
    }

    #[test]
    fn test_build_needs_hardware_driver() {
        let config = OutputConfig::from_toml_str("device = \"direct\"").unwrap();
        assert!(matches!(
            config.build(HardwareDrivers::default()),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_build_with_drivers() {
        let config = OutputConfig {
            pixel_count: 120,
            device: "direct".into(),
            grid: GridConfig {
                enabled: true,
                ..GridConfig::default()
            },
            ..OutputConfig::default()
        };
        let drivers = HardwareDrivers {
            strip: Some(Box::new(NullStrip)),
            grid: Some(Box::new(NullGrid)),
            ..HardwareDrivers::default()
        };
        let renderer = config.build(drivers).unwrap();

        assert!(renderer.gamma_correction());
        assert_eq!(renderer.frame().len(), 120);
        let sinks: Vec<(&str, u32)> = renderer
            .sinks()
            .map(|sink| (sink.name, sink.divisor))
            .collect();
        assert_eq!(sinks, [("direct_strip", 1), ("lighting_grid", 2)]);
    }

    #[test]
    fn test_build_udp_strip() {
        let controller = UdpSocket::bind("127.0.0.1:0").unwrap();
        controller.set_read_timeout(Some(Duration::from_secs(1))).unwrap();

        let config = OutputConfig {
            pixel_count: 4,
            gamma_correction: false,
            udp: UdpConfig {
                address: controller.local_addr().unwrap(),
                ..UdpConfig::default()
            },
            ..OutputConfig::default()
        };
        let mut renderer = config.build(HardwareDrivers::default()).unwrap();
        renderer.frame_mut().fill([1.0, 2.0, 3.0]);
        renderer.update();

        let mut buffer = [0u8; 64];
        let len = controller.recv(&mut buffer).unwrap();
        assert_eq!(&buffer[..len], &[0, 1, 2, 3, 1, 1, 2, 3, 2, 1, 2, 3, 3, 1, 2, 3]);
    }

    #[test]
    fn test_silent_bulbs_are_disabled() {
        let controller = UdpSocket::bind("127.0.0.1:0").unwrap();
        let silent_bulb = UdpSocket::bind("127.0.0.1:0").unwrap();

        let config = OutputConfig {
            pixel_count: 4,
            udp: UdpConfig {
                address: controller.local_addr().unwrap(),
                ..UdpConfig::default()
            },
            bulbs: BulbConfig {
                enabled: true,
                addresses: vec![silent_bulb.local_addr().unwrap()],
                timeout_ms: 20,
                ..BulbConfig::default()
            },
            ..OutputConfig::default()
        };
        let mut renderer = config.build(HardwareDrivers::default()).unwrap();
        assert!(renderer.sinks().all(|sink| sink.enabled));

        renderer.update();
        let status: Vec<(&str, bool)> = renderer
            .sinks()
            .map(|sink| (sink.name, sink.enabled))
            .collect();
        assert_eq!(status, [("udp_strip", true), ("smart_bulbs", false)]);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("led-fanout-{}.toml", std::process::id()));
        std::fs::write(&path, "pixel_count = 30\ngamma_table = \"builtin\"").unwrap();
        let config = OutputConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.pixel_count, 30);
    }
}
