use crate::engine::{Catalogue, Matcher};
use crate::{CollectorFamily, EventType, GcTrigger, Region, SafepointTrigger};

fn matcher(shapes: &[crate::Shape]) -> Matcher<'_> {
    Matcher::new(shapes).expect("catalogue is consistent")
}

/// Kilobyte region with every part present.
fn kb(before: u64, after: u64, capacity: u64) -> Option<Region> {
    Some(Region { before: Some(before), after: Some(after), capacity: Some(capacity) })
}

type Case = (&'static str, Option<CollectorFamily>, EventType, Option<u64>, Option<u64>, Option<Region>);

/// One literal line per shape form: (line, family hint, type, timestamp ms,
/// duration µs, combined heap KB).
fn cases() -> Vec<Case> {
    use CollectorFamily::{Cms, G1, Parallel, Serial, Shenandoah, Z};
    vec![
        // Banners and header.
        ("[0.002s][info][gc] Using Serial", None, EventType::UsingSerial, Some(2), None, None),
        ("[0.002s][info][gc] Using Parallel", None, EventType::UsingParallel, Some(2), None, None),
        ("[0.002s][info][gc] Using Concurrent Mark Sweep", None, EventType::UsingCms, Some(2), None, None),
        ("[0.002s][info][gc] Using G1", None, EventType::UsingG1, Some(2), None, None),
        ("[0.002s][info][gc] Using Shenandoah", None, EventType::UsingShenandoah, Some(2), None, None),
        ("[2021-11-05T14:47:31.092-0200][4ms] Using The Z Garbage Collector", None, EventType::UsingZ, Some(4), None, None),
        ("[0.003s][info][gc,init] Version: 17.0.1+12-LTS (release)", None, EventType::UnifiedHeader, Some(3), None, None),
        // Z.
        ("[0.124s][info][gc,phases   ] GC(0) Pause Mark Start 0.004ms", Some(Z), EventType::ZMarkStart, Some(124), Some(4), None),
        ("[0.129s][info][gc,phases   ] GC(0) Pause Mark End 0.006ms", None, EventType::ZMarkEnd, Some(129), Some(6), None),
        ("[0.132s][info][gc,phases   ] GC(0) Pause Relocate Start 0.003ms", None, EventType::ZRelocateStart, Some(132), Some(3), None),
        ("[0.200s][info][gc,phases   ] GC(2) Y: Pause Mark Start (Major) 0.010ms", None, EventType::ZMarkStartYoungAndOld, Some(200), Some(10), None),
        ("[0.300s][info][gc,phases   ] GC(3) Y: Pause Mark Start 0.011ms", None, EventType::ZMarkStartYoung, Some(300), Some(11), None),
        ("[0.310s][info][gc,phases   ] GC(3) Y: Pause Mark End 0.008ms", None, EventType::ZMarkEndYoung, Some(310), Some(8), None),
        ("[0.320s][info][gc,phases   ] GC(3) Y: Pause Relocate Start 0.004ms", None, EventType::ZRelocateStartYoung, Some(320), Some(4), None),
        ("[0.400s][info][gc,phases   ] GC(4) O: Pause Mark Start 0.005ms", None, EventType::ZMarkStartOld, Some(400), Some(5), None),
        ("[0.410s][info][gc,phases   ] GC(4) O: Pause Mark End 0.007ms", None, EventType::ZMarkEndOld, Some(410), Some(7), None),
        ("[0.228s][info][gc,phases   ] GC(2) O: Pause Relocate Start 0.006ms", Some(Z), EventType::ZRelocateStartOld, Some(228), Some(6), None),
        ("[76.001s][info][gc] Allocation Stall (main) 12.345ms", None, EventType::ZAllocationStall, Some(75989), Some(12345), None),
        (
            "[3.000s][info][gc] GC(3) Garbage Collection (Warmup) 14M(7%)->8M(4%)",
            None,
            EventType::ZGarbageCollection,
            Some(3000),
            None,
            Some(Region { before: Some(14336), after: Some(8192), capacity: None }),
        ),
        // Shenandoah, unified and JDK8.
        ("[0.437s][info][gc] GC(0) Pause Init Mark (process weakrefs) 0.575ms", None, EventType::ShenandoahInitMark, Some(436), Some(575), None),
        ("2020-03-10T08:03:29.364-0400: 0.426: [Pause Init Mark, 0.819 ms]", None, EventType::ShenandoahInitMark, Some(426), Some(819), None),
        ("[0.445s][info][gc] GC(0) Pause Final Mark (process weakrefs) 0.400ms", None, EventType::ShenandoahFinalMark, Some(445), Some(400), None),
        ("[0.460s][info][gc] GC(0) Pause Init Update Refs 0.020ms", None, EventType::ShenandoahInitUpdate, Some(460), Some(20), None),
        ("[0.470s][info][gc] GC(0) Pause Final Update Refs 0.300ms", None, EventType::ShenandoahFinalUpdate, Some(470), Some(300), None),
        ("2.000: [Pause Final Evac, 0.012 ms]", None, EventType::ShenandoahFinalEvac, Some(2000), Some(12), None),
        ("[0.480s][info][gc] GC(1) Pause Final Roots 0.030ms", None, EventType::ShenandoahFinalRoots, Some(480), Some(30), None),
        (
            "[52.883s][info][gc] GC(1632) Pause Degenerated GC (Mark) 60M->30M(64M) 53.697ms",
            None,
            EventType::ShenandoahDegeneratedGc,
            Some(52829),
            Some(53697),
            kb(61440, 30720, 65536),
        ),
        (
            "2020-03-10T08:03:46.283-0400: 17.345: [Pause Full 1589M->1002M(1690M), 4077.274 ms]",
            None,
            EventType::ShenandoahFullGc,
            Some(17345),
            Some(4077274),
            kb(1627136, 1026048, 1730560),
        ),
        (
            "[0.500s][info][gc] GC(0) Concurrent marking 16M->17M(32M) 2.135ms",
            Some(Shenandoah),
            EventType::ShenandoahConcurrent,
            Some(500),
            Some(2135),
            kb(16384, 17408, 32768),
        ),
        ("[0.410s][info][gc] Trigger: Learning 1 of 5. Free (47M) is below initial threshold (71M)", Some(Shenandoah), EventType::ShenandoahTrigger, Some(410), None, None),
        ("Trigger: Free (6M) is below minimum threshold (6M)", None, EventType::ShenandoahTrigger, None, None, None),
        ("[0.900s][info][gc] Cancelling GC: Allocation Failure", None, EventType::ShenandoahCancellingGc, Some(900), None, None),
        ("Cancelling GC: Allocation Failure", None, EventType::ShenandoahCancellingGc, None, None, None),
        // Unified G1.
        (
            "[16.629s][info][gc] GC(6) Pause Young (Mixed) (G1 Evacuation Pause) 15M->12M(31M) 1.202ms",
            None,
            EventType::UnifiedG1MixedPause,
            Some(16628),
            Some(1202),
            kb(15360, 12288, 31744),
        ),
        (
            "[2.000s][info][gc] GC(3) Pause Young (Concurrent Start) (G1 Humongous Allocation) 30M->28M(64M) 2.500ms",
            None,
            EventType::UnifiedG1YoungInitialMark,
            Some(1997),
            Some(2500),
            kb(30720, 28672, 65536),
        ),
        (
            "[3.000s][info][gc] GC(5) Pause Young (Prepare Mixed) (G1 Evacuation Pause) 40M->20M(64M) 4.000ms",
            None,
            EventType::UnifiedG1YoungPrepareMixed,
            Some(2996),
            Some(4000),
            kb(40960, 20480, 65536),
        ),
        (
            "[0.337s][info][gc] GC(0) Pause Young (Normal) (G1 Evacuation Pause) 25M->4M(254M) 3.523ms",
            None,
            EventType::UnifiedG1YoungPause,
            Some(333),
            Some(3523),
            kb(25600, 4096, 260096),
        ),
        (
            "[1.000s][info][gc,start] GC(6) Pause Young (Normal) (G1 Evacuation Pause) Humongous regions: 0->0 Metaspace: 76K->76K(1056768K) 24M->4M(256M) 3.213ms",
            None,
            EventType::UnifiedG1YoungPause,
            Some(1000),
            Some(3213),
            kb(24576, 4096, 262144),
        ),
        ("[5.000s][info][gc] GC(969) Pause Cleanup 28M->28M(46M) 0.064ms", None, EventType::UnifiedG1Cleanup, Some(5000), Some(64), kb(28672, 28672, 47104)),
        ("[4.000s][info][gc] GC(3) Pause Remark 20M->20M(64M) 2.000ms", None, EventType::UnifiedRemark, Some(3998), Some(2000), kb(20480, 20480, 65536)),
        (
            "[2021-03-13T03:37:40.051+0530][79853119ms] GC(8646) Pause Full (G1 Evacuation Pause) Humongous regions: 0->0 Metaspace: 214096K->214096K(739328K) 8186M->8178M(8192M) 2127.343ms User=16.40s Sys=0.09s Real=2.13s",
            Some(G1),
            EventType::UnifiedG1FullGc,
            Some(79853119),
            Some(2127343),
            kb(8382464, 8374272, 8388608),
        ),
        (
            "[89968.517s][info][gc] GC(1344) Pause Full (G1 Evacuation Pause) 16382M->13777M(16384M) 6796.352ms",
            None,
            EventType::UnifiedG1FullGc,
            Some(89961721),
            Some(6796352),
            kb(16775168, 14107648, 16777216),
        ),
        ("[10.000s][info][gc] GC(1) Pause Full (System.gc()) 10M->2M(64M) 25.000ms", None, EventType::UnifiedOld, Some(9975), Some(25000), kb(10240, 2048, 65536)),
        ("[10.000s][info][gc] GC(1) Pause Full (System.gc()) 10M->2M(64M) 25.000ms", Some(G1), EventType::UnifiedG1FullGc, Some(9975), Some(25000), kb(10240, 2048, 65536)),
        // Unified Serial, Parallel and CMS.
        (
            "[0.052s][info][gc,start] GC(0) Pause Young (Allocation Failure) DefNew: 1022K->127K(1152K) Tenured: 0K->350K(768K) Metaspace: 701K->701K(1056768K) 1M->0M(1M) 1.234ms User=0.00s Sys=0.00s Real=0.00s",
            None,
            EventType::UnifiedSerialNew,
            Some(52),
            Some(1234),
            kb(1024, 0, 1024),
        ),
        (
            "[0.075s][info][gc,start] GC(2) Pause Full (Allocation Failure) DefNew: 1023K->0K(1152K) Tenured: 350K->350K(768K) Metaspace: 701K->701K(1056768K) 1M->0M(1M) 2.000ms",
            None,
            EventType::UnifiedSerialOld,
            Some(75),
            Some(2000),
            kb(1024, 0, 1024),
        ),
        (
            "[0.100s][info][gc,start] GC(0) Pause Young (Allocation Failure) PSYoungGen: 512K->64K(1024K) ParOldGen: 0K->8K(2048K) Metaspace: 701K->701K(1056768K) 0M->0M(3M) 1.500ms User=0.01s Sys=0.00s Real=0.00s",
            None,
            EventType::UnifiedParallelScavenge,
            Some(100),
            Some(1500),
            kb(0, 0, 3072),
        ),
        (
            "[0.083s][info][gc,start] GC(3) Pause Full (Ergonomics) PSYoungGen: 502K->496K(1536K) ParOldGen: 472K->432K(2048K) Metaspace: 701K->701K(1056768K) 0M->0M(3M) 4.336ms User=0.01s Sys=0.00s Real=0.01s",
            None,
            EventType::UnifiedParallelCompactingOld,
            Some(83),
            Some(4336),
            kb(0, 0, 3072),
        ),
        (
            "[0.200s][info][gc,start] GC(1) Pause Young (Allocation Failure) ParNew: 1000K->100K(2000K) CMS: 500K->600K(4000K) Metaspace: 701K->701K(1056768K) 1M->0M(5M) 3.000ms",
            None,
            EventType::UnifiedParNew,
            Some(200),
            Some(3000),
            kb(1024, 0, 5120),
        ),
        (
            "[0.300s][info][gc] GC(2) Pause Young (Allocation Failure) 24M->4M(94M) 12.345ms User=0.02s Sys=0.00s Real=0.01s",
            Some(Serial),
            EventType::UnifiedSerialNew,
            Some(288),
            Some(12345),
            kb(24576, 4096, 96256),
        ),
        (
            "[0.300s][info][gc] GC(2) Pause Young (Allocation Failure) 24M->4M(94M) 12.345ms User=0.02s Sys=0.00s Real=0.01s",
            Some(Parallel),
            EventType::UnifiedParallelScavenge,
            Some(288),
            Some(12345),
            kb(24576, 4096, 96256),
        ),
        (
            "[0.300s][info][gc] GC(2) Pause Young (Allocation Failure) 24M->4M(94M) 12.345ms User=0.02s Sys=0.00s Real=0.01s",
            Some(Cms),
            EventType::UnifiedParNew,
            Some(288),
            Some(12345),
            kb(24576, 4096, 96256),
        ),
        ("[0.500s][info][gc] GC(1) Pause Initial Mark 1M->1M(2M) 0.300ms", None, EventType::UnifiedCmsInitialMark, Some(500), Some(300), kb(1024, 1024, 2048)),
        ("[1.000s][info][gc] GC(2) Pause Young (Allocation Failure) 24M->4M(94M) 12.345ms", None, EventType::UnifiedYoung, Some(988), Some(12345), kb(24576, 4096, 96256)),
        // Unified concurrent and stopped time.
        ("[2.000s][info][gc] GC(5) Concurrent Mark Cycle 25.123ms", None, EventType::UnifiedConcurrent, Some(2000), None, None),
        (
            "[10.000s][info][safepoint] Safepoint \"G1CollectForAllocation\", Time since last: 1234 ns, Reaching safepoint: 1000 ns, At safepoint: 1499000 ns, Total: 1500000 ns",
            None,
            EventType::UnifiedSafepoint,
            Some(9998),
            Some(1500),
            None,
        ),
        (
            "[5.000s][info][safepoint] Total time for which application threads were stopped: 0.0010000 seconds, Stopping threads took: 0.0000100 seconds",
            None,
            EventType::ApplicationStoppedTime,
            Some(4999),
            Some(1000),
            None,
        ),
        (
            "2.100: Total time for which application threads were stopped: 0.0025000 seconds, Stopping threads took: 0.0000050 seconds",
            None,
            EventType::ApplicationStoppedTime,
            Some(2097),
            Some(2500),
            None,
        ),
        ("2.000: Application time: 0.1234000 seconds", None, EventType::ApplicationConcurrentTime, Some(2000), None, None),
        // JDK8 G1.
        (
            "3.000: [GC pause (G1 Humongous Allocation) (young) (initial-mark) 30M->28M(64M), 0.0050000 secs]",
            None,
            EventType::G1YoungInitialMark,
            Some(3000),
            Some(5000),
            kb(30720, 28672, 65536),
        ),
        (
            "4.000: [GC pause (G1 Evacuation Pause) (mixed) 40M->20M(64M), 0.0100000 secs]",
            None,
            EventType::G1MixedPause,
            Some(4000),
            Some(10000),
            kb(40960, 20480, 65536),
        ),
        (
            "2.192: [GC pause (G1 Evacuation Pause) (young), 0.0209631 secs][Eden: 128.0M(128.0M)->0.0B(112.0M) Survivors: 0.0B->16.0M Heap: 128.0M(2048.0M)->31.7M(2048.0M)] [Times: user=0.04 sys=0.01, real=0.02 secs]",
            None,
            EventType::G1YoungPause,
            Some(2192),
            Some(20963),
            kb(131072, 32461, 2097152),
        ),
        (
            "1302.524: [Full GC (System.gc())  653M->586M(979M), 1.6364900 secs][Eden: 33.0M(460.0M)->0.0B(477.0M) Survivors: 16.0M->0.0B Heap: 653.3M(979.0M)->586.4M(979.0M)], [Metaspace: 3470K->3470K(1056768K)] [Times: user=2.23 sys=0.02, real=1.64 secs]",
            None,
            EventType::G1FullGc,
            Some(1302524),
            Some(1636490),
            kb(668979, 600474, 1002496),
        ),
        ("5.000: [Full GC (Allocation Failure)  1019M->28M(2048M), 0.0826750 secs]", Some(G1), EventType::G1FullGc, Some(5000), Some(82675), kb(1043456, 28672, 2097152)),
        ("5.000: [Full GC (Allocation Failure)  1019M->28M(2048M), 0.0826750 secs]", None, EventType::VerboseGcOld, Some(5000), Some(82675), kb(1043456, 28672, 2097152)),
        (
            "2971.469: [GC remark 2971.470: [GC ref-proc, 0.0035549 secs], 0.0188660 secs] [Times: user=0.09 sys=0.00, real=0.02 secs]",
            None,
            EventType::G1Remark,
            Some(2971469),
            Some(18866),
            None,
        ),
        ("2972.698: [GC cleanup 1252M->1247M(2048M), 0.0011536 secs]", None, EventType::G1Cleanup, Some(2972698), Some(1154), kb(1282048, 1276928, 2097152)),
        ("1.000: [GC concurrent-mark-end, 0.0223090 secs]", None, EventType::G1Concurrent, Some(1000), None, None),
        // JDK8 Serial, Parallel and CMS.
        (
            "2.454: [Full GC (System.gc()) 2.454: [Tenured: 0K->350K(768K), 0.0049 secs] 1022K->350K(1920K), [Metaspace: 2720K->2720K(1056768K)], 0.0050 secs] [Times: user=0.00 sys=0.00, real=0.01 secs]",
            None,
            EventType::SerialOld,
            Some(2454),
            Some(5000),
            kb(1022, 350, 1920),
        ),
        (
            "1.234: [GC (Allocation Failure) 1.234: [DefNew: 1024K->128K(1152K), 0.0021 secs] 1024K->340K(3968K), 0.0022 secs] [Times: user=0.00 sys=0.00, real=0.00 secs]",
            None,
            EventType::SerialNew,
            Some(1234),
            Some(2200),
            kb(1024, 340, 3968),
        ),
        (
            "3.000: [Full GC (Ergonomics) [PSYoungGen: 5089K->0K(44800K)] [ParOldGen: 17K->4965K(102400K)] 5106K->4965K(147200K), [Metaspace: 2849K->2849K(1056768K)], 0.0139 secs]",
            None,
            EventType::ParallelCompactingOld,
            Some(3000),
            Some(13900),
            kb(5106, 4965, 147200),
        ),
        (
            "4.000: [Full GC (Ergonomics) [PSYoungGen: 5089K->0K(44800K)] [PSOldGen: 17K->4965K(102400K)] 5106K->4965K(147200K), [Metaspace: 2849K->2849K(1056768K)], 0.0139 secs]",
            None,
            EventType::ParallelSerialOld,
            Some(4000),
            Some(13900),
            kb(5106, 4965, 147200),
        ),
        (
            "1.234: [GC (Allocation Failure) [PSYoungGen: 512K->64K(1024K)] 512K->64K(4096K), 0.0012 secs] [Times: user=0.01 sys=0.00, real=0.00 secs]",
            None,
            EventType::ParallelScavenge,
            Some(1234),
            Some(1200),
            kb(512, 64, 4096),
        ),
        (
            "44.684: [GC (Allocation Failure) 44.684: [ParNew (promotion failed): 1887488K->1887488K(1887488K), 0.3 secs]44.984: [CMS: 3456K->3556K(4096K), 5.1 secs] 5343K->3556K(5984K), [Metaspace: 2720K->2720K(1056768K)], 5.4 secs]",
            None,
            EventType::CmsSerialOld,
            Some(44684),
            Some(5400000),
            kb(5343, 3556, 5984),
        ),
        (
            "20.189: [GC (Allocation Failure) 20.190: [ParNew: 471872K->52416K(471872K), 0.0434 secs] 1100219K->710986K(2044736K), 0.0435 secs]",
            None,
            EventType::ParNew,
            Some(20189),
            Some(43500),
            kb(1100219, 710986, 2044736),
        ),
        (
            "2016-10-10T18:43:49.025-0400: 2.170: [GC (Allocation Failure) 2.170: [ParNew: 1000K->100K(2000K), 0.0123000 secs] 5000K->4000K(10000K), 0.0124000 secs] [Times: user=0.02 sys=0.00, real=0.01 secs] ",
            None,
            EventType::ParNew,
            Some(2170),
            Some(12400),
            kb(5000, 4000, 10000),
        ),
        (
            "8.722: [GC (CMS Initial Mark) [1 CMS-initial-mark: 0K(5592K)] 1M(8M), 0.0012 secs]",
            None,
            EventType::CmsInitialMark,
            Some(8722),
            Some(1200),
            Some(Region { before: Some(1024), after: None, capacity: Some(8192) }),
        ),
        (
            "13.749: [GC (CMS Final Remark)[YG occupancy: 149636 K (153600 K)]13.749: [Rescan (parallel) , 0.0216 secs][1 CMS-remark: 21111K(40960K)] 170747K(194560K), 0.0314 secs]",
            None,
            EventType::CmsRemark,
            Some(13749),
            Some(31400),
            Some(Region { before: Some(170747), after: None, capacity: Some(194560) }),
        ),
        (
            "2016-10-10T18:43:49.030-0400: 2.175: [CMS-concurrent-abortable-preclean: 0.100/0.200 secs] [Times: user=0.10 sys=0.00, real=0.20 secs] ",
            None,
            EventType::CmsConcurrent,
            Some(2175),
            None,
            None,
        ),
        ("2.100: [GC (Allocation Failure)  1024K->340K(3968K), 0.0022 secs]", None, EventType::VerboseGcYoung, Some(2100), Some(2200), kb(1024, 340, 3968)),
        // Headers and informational lines.
        ("{Heap before GC invocations=261 (full 10):", None, EventType::HeapAtGc, None, None, None),
        (" PSYoungGen      total 434880K, used 89473K [0x00000000eab00000, 0x0000000100000000, 0x0000000100000000)", None, EventType::HeapAtGc, None, None, None),
        ("Desired survivor size 2228224 bytes, new threshold 1 (max 15)", None, EventType::TenuringDistribution, None, None, None),
        ("- age   1:    2228136 bytes,    2228136 total", None, EventType::TenuringDistribution, None, None, None),
        ("GC locker: Trying a full collection because scavenge failed", None, EventType::GcLocker, None, None, None),
        (
            "Java HotSpot(TM) 64-Bit Server VM (25.131-b11) for linux-amd64 JRE (1.8.0_131-b11), built on Mar 15 2017 01:23:40 by \"java_re\" with gcc 4.3.0 20080428 (Red Hat 4.3.0-8)",
            None,
            EventType::HeaderVersion,
            None,
            None,
            None,
        ),
        ("Memory: 4k page, physical 65806300k(58281908k free), swap 16777212k(16777212k free)", None, EventType::HeaderMemory, None, None, None),
        ("CommandLine flags: -XX:InitialHeapSize=2147483648 -XX:+PrintGC", None, EventType::HeaderCommandLineFlags, None, None, None),
        ("", None, EventType::BlankLine, None, None, None),
    ]
}

#[test]
fn shapes_identify_and_hydrate() {
    let shapes = super::get();
    let matcher = matcher(&shapes);

    for (line, family, kind, timestamp, duration, combined) in cases() {
        let event = matcher
            .parse(line, family, None)
            .expect("consistent catalogue")
            .unwrap_or_else(|| panic!("no shape matched: {line}"));
        assert_eq!(event.kind(), kind, "{line}");
        assert_eq!(event.timestamp(), timestamp, "{line}");
        assert_eq!(event.duration(), duration, "{line}");
        assert_eq!(event.combined(), combined.as_ref(), "{line}");
    }
}

#[test]
fn every_registered_shape_has_a_case() {
    let covered: Vec<EventType> = cases().into_iter().map(|(_, _, kind, ..)| kind).collect();
    for shape in super::get() {
        assert!(covered.contains(&shape.kind), "no hydration case for {}", shape.kind);
    }
}

#[test]
fn generation_regions_are_hydrated() {
    let shapes = super::get();
    let matcher = matcher(&shapes);
    let parse = |line: &str| matcher.parse(line, None, None).expect("consistent catalogue").expect("matched");

    let serial = parse(
        "[0.052s][info][gc,start] GC(0) Pause Young (Allocation Failure) DefNew: 1022K->127K(1152K) Tenured: 0K->350K(768K) Metaspace: 701K->701K(1056768K) 1M->0M(1M) 1.234ms User=0.00s Sys=0.00s Real=0.00s",
    );
    assert_eq!(serial.young(), kb(1022, 127, 1152).as_ref());
    assert_eq!(serial.old(), kb(0, 350, 768).as_ref());
    assert_eq!(serial.perm(), kb(701, 701, 1056768).as_ref());
    assert_eq!(serial.trigger(), Some(GcTrigger::AllocationFailure));

    let g1_full = parse(
        "1302.524: [Full GC (System.gc())  653M->586M(979M), 1.6364900 secs][Eden: 33.0M(460.0M)->0.0B(477.0M) Survivors: 16.0M->0.0B Heap: 653.3M(979.0M)->586.4M(979.0M)], [Metaspace: 3470K->3470K(1056768K)] [Times: user=2.23 sys=0.02, real=1.64 secs]",
    );
    assert_eq!(g1_full.young(), kb(33792, 0, 488448).as_ref());
    assert_eq!(g1_full.perm(), kb(3470, 3470, 1056768).as_ref());
    assert_eq!(g1_full.trigger(), Some(GcTrigger::SystemGc));
    assert_eq!(g1_full.parallelism(), Some(138));

    let cms_initial = parse("8.722: [GC (CMS Initial Mark) [1 CMS-initial-mark: 0K(5592K)] 1M(8M), 0.0012 secs]");
    assert_eq!(cms_initial.old(), Some(&Region { before: Some(0), after: None, capacity: Some(5592) }));

    let promotion = parse(
        "44.684: [GC (Allocation Failure) 44.684: [ParNew (promotion failed): 1887488K->1887488K(1887488K), 0.3 secs]44.984: [CMS: 3456K->3556K(4096K), 5.1 secs] 5343K->3556K(5984K), [Metaspace: 2720K->2720K(1056768K)], 5.4 secs]",
    );
    assert_eq!(promotion.trigger(), Some(GcTrigger::PromotionFailed));
    assert_eq!(promotion.old(), kb(3456, 3556, 4096).as_ref());

    let safepoint = parse(
        "[10.000s][info][safepoint] Safepoint \"G1CollectForAllocation\", Time since last: 1234 ns, Reaching safepoint: 1000 ns, At safepoint: 1499000 ns, Total: 1500000 ns",
    );
    assert_eq!(safepoint.safepoint_trigger(), Some(SafepointTrigger::G1CollectForAllocation));
}

#[test]
fn g1_full_collection_fields() {
    let shapes = super::get();
    let matcher = matcher(&shapes);
    let line = "[2021-03-13T03:37:40.051+0530][79853119ms] GC(8646) Pause Full (G1 Evacuation Pause) Humongous regions: 0->0 Metaspace: 214096K->214096K(739328K) 8186M->8178M(8192M) 2127.343ms User=16.40s Sys=0.09s Real=2.13s";
    let event = matcher.parse(line, None, None).expect("consistent catalogue").expect("matched");

    assert_eq!(event.trigger(), Some(GcTrigger::G1EvacuationPause));
    assert_eq!(event.combined(), Some(&Region { before: Some(8186 * 1024), after: Some(8178 * 1024), capacity: Some(8192 * 1024) }));
    assert_eq!(event.perm(), Some(&Region { before: Some(214096), after: Some(214096), capacity: Some(739328) }));
    // (1640 + 9) * 100 / 213, rounded up.
    assert_eq!(event.parallelism(), Some(775));
    assert!(event.is_blocking());
}

#[test]
fn trailing_blanks_are_tolerated() {
    let shapes = super::get();
    let matcher = matcher(&shapes);
    assert_eq!(
        matcher.identify("[0.124s][info][gc,phases   ] GC(0) Pause Mark Start 0.004ms   ", None),
        Some(EventType::ZMarkStart)
    );
    assert_eq!(
        matcher.identify("1.234: [GC (Allocation Failure) [PSYoungGen: 512K->64K(1024K)] 512K->64K(4096K), 0.0012 secs] ", None),
        Some(EventType::ParallelScavenge)
    );
}

#[test]
fn leading_garbage_is_rejected() {
    let shapes = super::get();
    let matcher = matcher(&shapes);
    let lines = [
        "xx[0.124s][info][gc,phases   ] GC(0) Pause Mark Start 0.004ms",
        "garbage 1.234: [GC (Allocation Failure) [PSYoungGen: 512K->64K(1024K)] 512K->64K(4096K), 0.0012 secs]",
    ];
    for line in lines {
        assert_eq!(matcher.identify(line, None), None, "{line}");
    }
}

#[test]
fn catalogue_order_is_a_contract() {
    let shapes = super::get();
    let catalogue = Catalogue::new(&shapes).expect("catalogue is consistent");
    let pos = |kind| catalogue.position(kind).unwrap_or_else(|| panic!("{kind} not registered"));

    // (earlier, later)
    let pairs = vec![
        (EventType::UnifiedG1MixedPause, EventType::UnifiedG1YoungPause),
        (EventType::UnifiedG1YoungInitialMark, EventType::UnifiedG1YoungPause),
        (EventType::UnifiedG1FullGc, EventType::UnifiedOld),
        (EventType::UnifiedSerialNew, EventType::UnifiedYoung),
        (EventType::UnifiedParallelScavenge, EventType::UnifiedYoung),
        (EventType::G1YoungInitialMark, EventType::G1YoungPause),
        (EventType::ParallelScavenge, EventType::VerboseGcYoung),
        (EventType::SerialOld, EventType::VerboseGcOld),
    ];
    for (earlier, later) in pairs {
        assert!(pos(earlier) < pos(later), "{earlier} must precede {later}");
    }
}

#[test]
fn every_registered_type_has_a_consistent_classification() {
    for shape in super::get() {
        assert!(shape.kind.capabilities().is_consistent(), "{}", shape.kind);
        assert!(!shape.forms.is_empty(), "{}", shape.kind);
    }
}
